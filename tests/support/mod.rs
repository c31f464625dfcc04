use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};

/// Get a Command for blockport, with the graph env var cleared
pub fn blockport() -> Command {
    let mut cmd = cargo_bin_cmd!("blockport");
    cmd.env_remove("BLOCKPORT_GRAPH");
    cmd.env_remove("BLOCKPORT_LOG");
    cmd
}

pub const GRAPH: &str = r##"[
    {
        "uid": "page-1",
        "title": "Reading",
        "children": [
            {
                "uid": "b1",
                "string": "Books #toread",
                "children": [
                    { "uid": "b1a", "string": "Dune" },
                    { "uid": "b1b", "string": "Hyperion [[scifi]]" }
                ]
            },
            {
                "uid": "b2",
                "string": "",
                "children": [{ "uid": "b2a", "string": "Paper [[toread]]" }]
            },
            {
                "uid": "b3",
                "string": "Films",
                "children": [
                    { "uid": "b3a", "string": "Alien #scifi" },
                    { "uid": "b3b", "string": "Heat" }
                ]
            }
        ]
    },
    { "uid": "page-2", "title": "Empty" }
]"##;

/// Write the sample graph into `dir` and return its path
pub fn write_graph(dir: &Path) -> PathBuf {
    let path = dir.join("graph.json");
    fs::write(&path, GRAPH).unwrap();
    path
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
