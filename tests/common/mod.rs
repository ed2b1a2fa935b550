#![allow(dead_code)]

use std::{fs::File, io::BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;
use precastro::{
    ephemeris::{compiler::compile, Body, Origin, PositionEvaluator},
    time::fundamentals::StatusCode,
};

pub const HEADER_PATH: &str = "tests/data/header.test";
pub const DATA_PATH: &str = "tests/data/ascp.test";

/// KSIZE of the test ephemeris
pub const KSIZE: usize = 818;
/// Coefficients per data record of the test ephemeris
pub const NCOEFF: usize = 409;
/// Data records in the test ephemeris
pub const RECORDS: usize = 3;

pub fn open_fixture(path: &str) -> BufReader<File> {
    BufReader::new(File::open(path).unwrap())
}

/// Compile the test ephemeris into `dir` and return the path of the binary.
pub fn compile_fixture(dir: &Utf8Path) -> Utf8PathBuf {
    let binary = compile(open_fixture(HEADER_PATH), open_fixture(DATA_PATH)).unwrap();
    let path = dir.join("de405.test.bin");
    std::fs::write(&path, binary).unwrap();
    path
}

pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// Evaluator returning the same barycentric Earth position at any date.
pub struct StaticEarth {
    pub position: Vector3<f64>,
    pub status: StatusCode,
}

impl StaticEarth {
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        StaticEarth {
            position: Vector3::new(x, y, z),
            status: 0,
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        StaticEarth {
            position: Vector3::zeros(),
            status,
        }
    }
}

impl PositionEvaluator for StaticEarth {
    fn evaluate_position(
        &self,
        _jd1: f64,
        _jd2: f64,
        body: Body,
        origin: Origin,
    ) -> (StatusCode, Vector3<f64>) {
        assert_eq!(body, Body::Earth);
        assert_eq!(origin, Origin::SolarSystemBarycenter);
        (self.status, self.position)
    }
}
