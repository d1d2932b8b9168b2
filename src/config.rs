use crate::cli::Args;
use crate::error::PipelineError;
use crate::preprocessing::PipelineConfig;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: Option<String>,
    pub language: String,
    pub tessdata_path: Option<String>,
    pub pipeline: PipelineConfig,
}

impl TryFrom<&Args> for Config {
    type Error = PipelineError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        let pipeline = match &args.pipeline_config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        Ok(Self {
            engine: args.engine.clone(),
            language: args.language.clone(),
            tessdata_path: args.tessdata_path.clone(),
            pipeline,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: None,
            language: "eng".to_string(),
            tessdata_path: None,
            pipeline: PipelineConfig::default(),
        }
    }
}
