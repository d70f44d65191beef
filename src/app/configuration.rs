use crate::error::SelfEnergyError;
use config::{Config, File, FileFormat};
use serde::{de::DeserializeOwned, Deserialize};
use std::{env, fmt, path::Path, str::FromStr};

/// The top level configuration tables
#[derive(Debug, Deserialize)]
pub struct Configuration<T> {
    /// The `[phonon]` table
    pub phonon: PhononConfiguration<T>,
}

/// The electron-phonon interaction models which may be requested in the configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhononModel {
    /// Full phonon Green's function treatment, not yet implemented
    GreensFunction,
    /// Deformation potential coupling to the phonon bath
    DeformationPotential,
}

impl fmt::Display for PhononModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhononModel::GreensFunction => write!(f, "greens_function"),
            PhononModel::DeformationPotential => write!(f, "deformation_potential"),
        }
    }
}

impl FromStr for PhononModel {
    type Err = SelfEnergyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greens_function" => Ok(PhononModel::GreensFunction),
            "deformation_potential" => Ok(PhononModel::DeformationPotential),
            other => Err(SelfEnergyError::InvalidConfiguration(format!(
                "unrecognised phonon model `{other}`, expected one of `greens_function` or `deformation_potential`"
            ))),
        }
    }
}

/// Interaction model and phonon bath parameters
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PhononConfiguration<T> {
    /// The interaction model to evaluate
    pub model: PhononModel,
    /// Off-diagonals retained either side of the main diagonal
    pub num_diagonals: usize,
    /// Lattice temperature in Kelvin
    pub temperature: T,
    /// Energy of each phonon mode in electron volts, ordered as the coupling tensor's mode axis
    #[serde(default)]
    pub mode_energies: Vec<T>,
    /// Verify each computed slice is anti-hermitian
    #[serde(default)]
    pub security_checks: bool,
}

impl<T: DeserializeOwned> Configuration<T> {
    /// Loads `.config/default` overlaid by the optional `.config/{RUN_MODE}`
    pub fn build() -> Result<Self, SelfEnergyError> {
        Self::build_from_directory(".config")
    }

    /// Loads `default` overlaid by the optional `{RUN_MODE}` file from `directory`
    pub fn build_from_directory(directory: impl AsRef<Path>) -> Result<Self, SelfEnergyError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let directory = directory.as_ref();

        let s = Config::builder()
            // The default settings for the simulation which we use in the general case
            .add_source(File::with_name(&directory.join("default").to_string_lossy()))
            // The override settings which may be set by the user, optional
            .add_source(
                File::with_name(&directory.join(run_mode).to_string_lossy()).required(false),
            )
            .build()?;

        s.try_deserialize().map_err(|e| {
            SelfEnergyError::InvalidConfiguration(format!(
                "Failed to deserialize the config file: {:?}",
                e
            ))
        })
    }

    /// Loads the configuration from an in-memory TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, SelfEnergyError> {
        let s = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        s.try_deserialize().map_err(|e| {
            SelfEnergyError::InvalidConfiguration(format!(
                "Failed to deserialize the config string: {:?}",
                e
            ))
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Configuration, PhononModel};
    use crate::error::SelfEnergyError;

    #[test]
    fn deformation_potential_table_deserializes() {
        let contents = r#"
            [phonon]
            model = "deformation_potential"
            num_diagonals = 2
            temperature = 300.0
            mode_energies = [0.035, 0.02]
        "#;
        let config: Configuration<f64> = Configuration::from_toml_str(contents).unwrap();
        assert_eq!(config.phonon.model, PhononModel::DeformationPotential);
        assert_eq!(config.phonon.num_diagonals, 2);
        assert_eq!(config.phonon.mode_energies, vec![0.035, 0.02]);
        assert!(!config.phonon.security_checks);
    }

    #[test]
    fn unrecognised_model_is_an_invalid_configuration() {
        let contents = r#"
            [phonon]
            model = "polar_optical"
            num_diagonals = 1
            temperature = 300.0
        "#;
        let result: Result<Configuration<f64>, _> = Configuration::from_toml_str(contents);
        assert!(matches!(
            result,
            Err(SelfEnergyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn model_names_round_trip_through_display() {
        for model in [PhononModel::GreensFunction, PhononModel::DeformationPotential] {
            assert_eq!(model.to_string().parse::<PhononModel>().unwrap(), model);
        }
        assert!("acoustic".parse::<PhononModel>().is_err());
    }

    #[test]
    fn default_configuration_file_is_readable() {
        let config: Configuration<f64> =
            Configuration::build_from_directory(concat!(env!("CARGO_MANIFEST_DIR"), "/.config"))
                .unwrap();
        assert_eq!(config.phonon.model, PhononModel::DeformationPotential);
    }

    #[test]
    fn omitted_optional_fields_take_defaults_for_any_float() {
        let contents = r#"
            [phonon]
            model = "greens_function"
            num_diagonals = 0
            temperature = 77.0
        "#;
        let config: Configuration<f32> = Configuration::from_toml_str(contents).unwrap();
        assert_eq!(config.phonon.model, PhononModel::GreensFunction);
        assert_eq!(config.phonon.temperature, 77.0_f32);
        assert!(config.phonon.mode_energies.is_empty());
        assert!(!config.phonon.security_checks);
    }
}
