use relaxsweep::engine::config as core_config;

pub struct AppConfig {
    pub sweep: core_config::SweepConfig,
    pub engine_command: Vec<String>,
}
