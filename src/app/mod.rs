mod runner;


pub(crate) use runner::BatchRunner;
