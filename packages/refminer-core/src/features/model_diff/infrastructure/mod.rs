pub mod prefilter;
