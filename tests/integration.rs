#[path = "integration/bundle.rs"]
mod bundle;
#[path = "integration/check.rs"]
mod check;
#[path = "integration/cli.rs"]
mod cli;
#[path = "integration/resume.rs"]
mod resume;
