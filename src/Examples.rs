pub mod probe_examples;
