use std::path::PathBuf;

pub struct DefaultsConfig {
    pub root: PathBuf,
    pub run_prefix: String,
    /// Spin-lock field strengths ν₁ in Hz.
    pub conditions: Vec<f64>,
    pub samples: usize,
    pub engine_verbose: bool,
    pub engine_parallel: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("sweeps"),
            run_prefix: "run".to_string(),
            conditions: vec![2000.0, 7000.0, 12000.0, 14000.0, 22000.0],
            samples: 500,
            engine_verbose: false,
            engine_parallel: false,
        }
    }
}
