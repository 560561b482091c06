pub mod local_file_sink;
