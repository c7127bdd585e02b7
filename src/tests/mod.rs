mod helpers;

mod parser_tests;
mod report_tests;
