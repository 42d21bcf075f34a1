//! Random payment streams for stress testing and benchmarks.
