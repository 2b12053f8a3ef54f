mod glob_tests;
mod globs2_tests;
mod provider_tests;
