pub mod graph_diff;
