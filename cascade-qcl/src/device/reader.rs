use crate::{layers::QclLayers, strata::Waveguide};
use color_eyre::eyre::eyre;
use config::{Config, File};
use serde::Deserialize;
use std::{ops::Deref, path::PathBuf};

fn default_temperature() -> f64 {
    300.
}

/// A structure file: a layer stack and optionally the waveguide it is embedded in
#[derive(Clone, Debug, Deserialize)]
pub struct Device {
    /// Lattice temperature in Kelvin
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub structure: QclLayers,
    #[serde(default)]
    pub waveguide: Option<Waveguide>,
}

impl Deref for Device {
    type Target = QclLayers;

    fn deref(&self) -> &Self::Target {
        &self.structure
    }
}

impl Device {
    pub fn build(path: PathBuf) -> color_eyre::Result<Self> {
        let s = Config::builder().add_source(File::from(path)).build()?;
        s.try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize device: {:?}", e))
    }
}

#[cfg(test)]
mod test {
    use super::Device;
    use crate::{alloy::Substrate, strata::StrataMaterial};
    use config::{Config, File, FileFormat};

    const STRUCTURE: &str = r#"
temperature = 77.0

[structure]
substrate = "InP"
xres = 0.5
field = 35.0
repeats = 3

[[structure.layers]]
width = 40.0
material = 1
barrier = true

[[structure.layers]]
width = 60.0
material = 1
active = true
doping = 1.5

[waveguide]
wavelength = 4.7

[[waveguide.strata]]
material = "Air"
thickness = 1.0

[[waveguide.strata]]
material = "Active Core"
thickness = 2.0

[[waveguide.strata]]
material = "InP"
thickness = 3.0
doping = 0.5
"#;

    #[test]
    fn structure_files_deserialize() {
        let device: Device = Config::builder()
            .add_source(File::from_str(STRUCTURE, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(device.temperature, 77.);
        assert_eq!(device.substrate, Substrate::InP);
        assert_eq!(device.layers.len(), 2);
        assert!(device.layers[0].barrier);
        assert!(device.layers[1].active);
        assert_eq!(device.repeats, 3);
        // Unspecified numerics fall back to their defaults
        assert_eq!(device.vert_res, 0.5);

        let waveguide = device.waveguide.unwrap();
        assert_eq!(waveguide.strata[1].material, StrataMaterial::ActiveCore);
        assert_eq!(waveguide.active_core_count(), 1);
    }
}
