pub mod negotiator;
