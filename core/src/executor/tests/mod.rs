mod helpers;

mod basic_tests;
mod call_tests;
mod loop_tests;
mod operator_tests;
