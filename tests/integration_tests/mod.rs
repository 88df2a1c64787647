use std::fs;
use std::path::PathBuf;


fn data_output_path(test_name: &str) -> PathBuf {
    let path = PathBuf::from("data/integration_tests/").join(test_name);
    fs::create_dir_all(&path).expect("Failed to create output directory");
    path
}
