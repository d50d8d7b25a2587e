//! Mechanism for loading and sharing the analysis configuration

use heep_vid::{
    codec::{CutCodes, CutSet},
    registry::{self, CutRegistry},
};

use eyre::{ensure, eyre, Report, Result, WrapErr};

use std::{fs, path::Path, str::FromStr};

/// Analysis configuration
pub struct Configuration {
    /// Cut flow which the candidates were evaluated with
    pub registry: &'static CutRegistry,

    /// File holding the cut outcomes of every candidate
    pub input: String,

    /// Cuts left out of the "N-1" selection
    pub n_minus_one_cuts: Vec<String>,

    /// Cuts making up the required subset (empty means all cuts)
    pub required_cuts: Vec<String>,

    /// File which the report is written to
    pub report: String,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        // Read out the analysis configuration file or die trying.
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name).wrap_err_with(|| {
            format!("Could not read configuration file {}", file_name.display())
        })?;

        // We will iterate over the configuration items. These should be the
        // first non-whitespace chunk of text on each line, the rest of the
        // line being free-form commentary. We will ignore blank lines.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let config = Configuration {
            registry: next_item("registry")?.parse_registry()?,
            input: next_item("input")?.parse::<String>()?,
            n_minus_one_cuts: next_item("n_minus_one_cuts")?.parse_list(),
            required_cuts: next_item("required_cuts")?.parse_list(),
            report: next_item("report")?.parse::<String>()?,
        };

        // Display it, so that the log of a run tells what it did
        config.print();

        // Cut names must exist in the selected cut flow
        let codes = CutCodes::<u32>::new(config.registry)?;
        let n_minus_one = config.n_minus_one_set(&codes)?;
        config.required_set(&codes)?;

        // An N-1 selection which ignores every cut is a configuration mistake
        ensure!(
            n_minus_one.len() < config.registry.size(),
            "The N-1 selection should keep at least one cut"
        );

        // If nothing bad occured, we can now return the configuration
        Ok(config)
    }

    /// Cuts ignored by the N-1 selection
    pub fn n_minus_one_set(&self, codes: &CutCodes<u32>) -> Result<CutSet<u32>> {
        codes
            .cut_set_by_name(self.n_minus_one_cuts.iter().map(String::as_str))
            .wrap_err("Invalid configuration of n_minus_one_cuts")
    }

    /// Cuts required by the subset selection
    pub fn required_set(&self, codes: &CutCodes<u32>) -> Result<CutSet<u32>> {
        codes
            .cut_set_by_name(self.required_cuts.iter().map(String::as_str))
            .wrap_err("Invalid configuration of required_cuts")
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("REGISTRY       : {}", self.registry);
        println!("INPUT          : {}", self.input);
        println!("N-1 CUTS       : {}", self.n_minus_one_cuts.join(","));
        println!("REQUIRED CUTS  : {}", self.required_cuts.join(","));
        println!("REPORT         : {}", self.report);
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .map_err(Report::new)
            .wrap_err(format!("Could not parse configuration of {}", self.name))
    }

    /// Look up a cut flow by name
    fn parse_registry(self) -> Result<&'static CutRegistry> {
        registry::by_name(self.data).ok_or_else(|| {
            let known = registry::all().map(CutRegistry::name);
            eyre!(
                "Unknown cut flow {:?} in configuration of {} (known: {})",
                self.data,
                self.name,
                known.join(", ")
            )
        })
    }

    /// Parse a comma-separated list, where "-" stands for the empty list
    fn parse_list(self) -> Vec<String> {
        if self.data == "-" {
            return Vec::new();
        }
        self.data
            .split(',')
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
