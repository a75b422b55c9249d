//! One model carried through import, fan passes and export

use serde::{Deserialize, Serialize};
use shzmdl_core::{Error, Model, Result};
use shzmdl_fans::{collapse_fan, shed_fan, ExtractionReport, FanExtractionConfig, FanExtractor, ShedOptions, ShedReport};
use shzmdl_io::{
    NativeLayout, NativeWriteOptions, NativeWriter, ObjReadOptions, ObjReader, ObjWriter, StlWriteOptions, StlWriter,
    ModelWriter,
};
use std::path::Path;
use tracing::info;

/// Settings for every stage of a [`Pipeline`]
///
/// Stored as TOML with one table per stage. Missing tables and keys take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extraction: FanExtractionConfig,
    pub shed: ShedOptions,
    pub obj: ObjReadOptions,
    pub stl: StlWriteOptions,
    pub native: NativeWriteOptions,
}

impl PipelineConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    model: Model,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(model: Model) -> Self {
        Self::with_config(model, PipelineConfig::default())
    }

    pub fn with_config(model: Model, config: PipelineConfig) -> Self {
        Self { model, config }
    }

    /// Load an OBJ file using the default configuration
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_obj_with_config(path, PipelineConfig::default())
    }

    pub fn from_obj_with_config<P: AsRef<Path>>(path: P, config: PipelineConfig) -> Result<Self> {
        let path = path.as_ref();
        let model = ObjReader::read_with_options(path, &config.obj)?;
        info!(path = %path.display(), %model, "model loaded");
        Ok(Self::with_config(model, config))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    pub fn extract_fans(&mut self) -> ExtractionReport {
        FanExtractor::with_config(self.config.extraction).extract(&mut self.model)
    }

    /// Shed `fans[fan_index]` with the configured scale and grouping
    pub fn shed(&mut self, fan_index: usize) -> Result<ShedReport> {
        shed_fan(&mut self.model, fan_index, &self.config.shed)
    }

    /// Replace `fans[fan_index]` with plain triangles, returning how many
    /// were added
    pub fn collapse(&mut self, fan_index: usize) -> Result<usize> {
        collapse_fan(&mut self.model, fan_index)
    }

    /// Write the model as binary STL, returning the triangle record count
    pub fn write_legacy<P: AsRef<Path>>(&self, path: P) -> Result<u32> {
        StlWriter::write_with_options(&self.model, path, &self.config.stl)
    }

    pub fn write_native<P: AsRef<Path>>(&self, path: P) -> Result<NativeLayout> {
        NativeWriter::write_with_options(&self.model, path, &self.config.native)
    }

    pub fn write_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ObjWriter::write_model(&self.model, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shzmdl_core::{Point3f, Triangle};
    use shzmdl_io::{ModelType, PolygonPolicy};

    fn make_cone(segments: usize) -> Model {
        let mut model = Model::new();
        let apex = model.add_position(Point3f::new(0.0, 0.0, 1.0));
        for i in 0..segments {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            model.add_position(Point3f::new(a.cos(), a.sin(), 0.0));
        }
        for i in 0..segments {
            let b = 1 + i;
            let c = 1 + (i + 1) % segments;
            model.add_triangle(Triangle::from_positions(apex, b, c));
        }
        model
    }

    #[test]
    fn test_extract_then_collapse() {
        let mut pipeline = Pipeline::new(make_cone(12));
        let report = pipeline.extract_fans();
        assert_eq!(report.fans_created, 1);
        assert!(pipeline.model().triangles.is_empty());

        assert_eq!(pipeline.collapse(0).unwrap(), 10);
        let model = pipeline.into_model();
        assert!(model.fans.is_empty());
        assert_eq!(model.triangles.len(), 10);
    }

    #[test]
    fn test_shed_uses_config() {
        let config = PipelineConfig {
            shed: ShedOptions::new(0.25, 2),
            ..Default::default()
        };
        let mut pipeline = Pipeline::with_config(make_cone(12), config);
        pipeline.extract_fans();
        let report = pipeline.shed(0).unwrap();
        assert_eq!(report.blades, 6);
        assert_eq!(report.quads_added, 12);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = PipelineConfig {
            extraction: FanExtractionConfig::default().with_min_valence(6),
            shed: ShedOptions::new(0.75, 3),
            obj: ObjReadOptions::default().with_polygon_policy(PolygonPolicy::Reject),
            stl: StlWriteOptions::default().with_header("shzmdl export"),
            native: NativeWriteOptions {
                version: 2,
                model_type: ModelType::VertexNormals,
            },
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let text = "[shed]\ngrouping = 2\n\n[native]\nmodel_type = \"Untextured\"\n";
        let config = PipelineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.shed, ShedOptions::new(0.5, 2));
        assert_eq!(config.native.version, 1);
        assert_eq!(config.native.model_type, ModelType::Untextured);
        assert_eq!(config.extraction, FanExtractionConfig::default());
        assert_eq!(config.obj.polygon_policy, PolygonPolicy::Skip);

        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
        assert!(matches!(
            PipelineConfig::from_toml_str("[shed]\nscale = \"half\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_writers_use_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            stl: StlWriteOptions::default().with_header("cone"),
            native: NativeWriteOptions {
                model_type: ModelType::Untextured,
                ..Default::default()
            },
            ..Default::default()
        };
        let config_path = dir.path().join("pipeline.toml");
        config.save_to_file(&config_path).unwrap();

        let mut pipeline = Pipeline::with_config(make_cone(12), PipelineConfig::from_file(&config_path).unwrap());
        pipeline.extract_fans();

        let stl = dir.path().join("cone.stl");
        assert_eq!(pipeline.write_legacy(&stl).unwrap(), 12);
        assert_eq!(&std::fs::read(&stl).unwrap()[..4], b"cone");

        let native = dir.path().join("cone.shzmdl");
        let layout = pipeline.write_native(&native).unwrap();
        let bytes = std::fs::read(&native).unwrap();
        assert_eq!(bytes.len(), layout.total_bytes());
        assert_eq!(bytes[28], ModelType::Untextured.tag());
    }

    #[test]
    fn test_stage_errors_propagate() {
        let mut pipeline = Pipeline::new(make_cone(4));
        assert!(pipeline.shed(0).is_err());
        assert!(pipeline.collapse(0).is_err());
    }
}
