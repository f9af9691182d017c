//! magnetic-label: size, inspect and export two-color magnetic labels.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use magnetic_label::backend::scad::scad_source;
use magnetic_label::errors::{BackendError, ConfigError, LabelError};
use magnetic_label::float_types::Real;
use magnetic_label::fonts::FontLibrary;
use magnetic_label::openscad::{self, OpenScad};
use magnetic_label::{
    AutoSizer, ExportPlan, LabelSpec, NativeBackend, OpenScadBackend, RenderBackend, RenderMode,
    SizingResult, compose_layers, export_label,
};
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

/// Parametric two-color magnetic labels for multi-material 3D printing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure the label text and propose a label size
    Size {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        tools: ToolArgs,
    },
    /// Print the layer stack of the label
    Layers {
        #[command(flatten)]
        spec: SpecArgs,
        /// Render mode to list (all, color1, color2)
        #[arg(long, default_value = "all")]
        mode: RenderMode,
    },
    /// Write a single STL (or OpenSCAD source) in one render mode
    Preview {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        tools: ToolArgs,
        /// Render mode (all, color1, color2); defaults to the config value
        #[arg(long)]
        mode: Option<RenderMode>,
        /// Output file; a `.scad` extension writes OpenSCAD source instead
        #[arg(short, long, value_name = "FILE", default_value = "label_preview.stl")]
        output: PathBuf,
    },
    /// Write the color1 and color2 STL files
    Export {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        tools: ToolArgs,
        /// Size the label to its text before exporting
        #[arg(long)]
        auto_size: bool,
        /// Accept the proposed size without asking
        #[arg(short, long)]
        yes: bool,
        /// Directory for the default file names
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Output file for color1 (base, frame, text, icon)
        #[arg(long, value_name = "FILE")]
        color1_out: Option<PathBuf>,
        /// Output file for color2 (inlay)
        #[arg(long, value_name = "FILE")]
        color2_out: Option<PathBuf>,
    },
}

/// Parameter set: a TOML file, overridden field by field from the command line.
#[derive(Args, Debug, Clone)]
struct SpecArgs {
    /// TOML parameter file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Label text
    #[arg(short, long)]
    text: Option<String>,

    /// Capital height of the text in mm
    #[arg(long, value_name = "MM")]
    font_size: Option<Real>,

    /// Font name, e.g. "Arial:style=Bold"
    #[arg(long, value_name = "NAME")]
    font: Option<String>,

    /// Use this font file for the label font
    #[arg(long, value_name = "FILE")]
    font_file: Option<PathBuf>,

    #[arg(long, value_name = "MM")]
    width: Option<Real>,

    #[arg(long, value_name = "MM")]
    height: Option<Real>,

    /// Number of magnets (2 or 4)
    #[arg(long, value_name = "N")]
    magnets: Option<u32>,

    /// Preview color of base, frame and text
    #[arg(long, value_name = "COLOR")]
    color1: Option<String>,

    /// Preview color of the inlay
    #[arg(long, value_name = "COLOR")]
    color2: Option<String>,
}

impl SpecArgs {
    fn load(&self) -> Result<LabelSpec> {
        let mut spec = match &self.config {
            Some(path) => LabelSpec::from_toml_file(path)?,
            None => LabelSpec::default(),
        };
        if let Some(text) = &self.text {
            spec.label_text = text.clone();
        }
        if let Some(size) = self.font_size {
            spec.font_size = size;
        }
        if let Some(font) = &self.font {
            spec.font_name = font.clone();
        }
        if let Some(width) = self.width {
            spec.label_width = width;
        }
        if let Some(height) = self.height {
            spec.label_height = height;
        }
        if let Some(count) = self.magnets {
            spec.magnet_count = count;
        }
        if let Some(color) = &self.color1 {
            spec.preview_color1 = color.clone();
        }
        if let Some(color) = &self.color2 {
            spec.preview_color2 = color.clone();
        }
        Ok(spec)
    }

    fn fonts(&self, spec: &LabelSpec) -> FontLibrary {
        match &self.font_file {
            Some(path) => FontLibrary::new().with_override(spec.font_name.clone(), path.clone()),
            None => FontLibrary::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Build meshes in-process
    Native,
    /// Generate OpenSCAD source and run `openscad -o`
    Openscad,
}

/// External tools.
#[derive(Args, Debug, Clone)]
struct ToolArgs {
    #[arg(long, value_enum, default_value_t = BackendKind::Native)]
    backend: BackendKind,

    /// Path of the OpenSCAD executable
    #[arg(long, value_name = "PATH")]
    openscad: Option<PathBuf>,

    /// Seconds a single OpenSCAD run may take
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,
}

impl ToolArgs {
    fn openscad(&self) -> Option<OpenScad> {
        let program = match &self.openscad {
            Some(path) => Some(path.clone()),
            None => openscad::find_openscad(),
        };
        program.map(|p| OpenScad::new(p).with_timeout(Duration::from_secs(self.timeout)))
    }

    fn backend(&self, fonts: FontLibrary) -> Result<Box<dyn RenderBackend>, BackendError> {
        match self.backend {
            BackendKind::Native => Ok(Box::new(NativeBackend::new(fonts))),
            BackendKind::Openscad => {
                let openscad = self.openscad().ok_or(BackendError::NotFound)?;
                Ok(Box::new(OpenScadBackend::new(openscad)))
            },
        }
    }
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("installing the log subscriber")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging() {
        eprintln!("warning: {e:#}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        },
    }
}

/// 2 for configuration problems, 3 for a missing or failing backend,
/// 1 for everything else.
fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(label_error) = error.downcast_ref::<LabelError>() {
        return match label_error {
            LabelError::Config(_) => 2,
            LabelError::Backend(_) => 3,
            _ => 1,
        };
    }
    if error.downcast_ref::<ConfigError>().is_some()
        || error.downcast_ref::<toml::de::Error>().is_some()
    {
        return 2;
    }
    if error.downcast_ref::<BackendError>().is_some() {
        return 3;
    }
    1
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Size { spec, tools } => {
            let label = spec.load()?;
            let result = sizer(&spec, &tools, &label).size(&label);
            print_sizing(&label, &result);
            Ok(())
        },
        Command::Layers { spec, mode } => {
            let label = spec.load()?;
            print_layers(&label, mode)?;
            Ok(())
        },
        Command::Preview {
            spec,
            tools,
            mode,
            output,
        } => {
            let label = spec.load()?;
            let mode = mode.unwrap_or(label.render_mode);
            if is_scad(&output) {
                std::fs::write(&output, scad_source(&label, mode)?)
                    .with_context(|| format!("writing {}", output.display()))?;
                println!("wrote {}", output.display());
                return Ok(());
            }
            let backend = tools.backend(spec.fonts(&label))?;
            let file = backend.render(&label, mode, &output)?;
            println!("wrote {} ({} KiB)", file.path.display(), file.bytes.div_ceil(1024));
            Ok(())
        },
        Command::Export {
            spec,
            tools,
            auto_size,
            yes,
            dir,
            color1_out,
            color2_out,
        } => {
            let mut label = spec.load()?;
            label.validate()?;
            if auto_size {
                let result = sizer(&spec, &tools, &label).size(&label);
                print_sizing(&label, &result);
                if yes || confirm("Use recommended size?")? {
                    label = result.apply_to(&label);
                } else {
                    println!("keeping {} x {} mm", label.label_width, label.label_height);
                }
            }

            let defaults = ExportPlan::for_text(&label.label_text, &dir);
            let plan = ExportPlan::new(
                color1_out.unwrap_or(defaults.color1),
                color2_out.unwrap_or(defaults.color2),
            );
            let backend = tools.backend(spec.fonts(&label))?;
            debug!(backend = backend.name(), ?plan, "exporting");
            let report = export_label(backend.as_ref(), &label, &plan)?;
            for file in [&report.color1, &report.color2] {
                println!(
                    "{:<7} {} ({} KiB)",
                    file.mode.as_str(),
                    file.path.display(),
                    file.bytes.div_ceil(1024)
                );
            }
            Ok(())
        },
    }
}

fn sizer(spec: &SpecArgs, tools: &ToolArgs, label: &LabelSpec) -> AutoSizer {
    AutoSizer::standard(tools.openscad(), spec.fonts(label), label.curve_segments)
}

fn print_sizing(label: &LabelSpec, result: &SizingResult) {
    println!("{:<18} {:?}", "Text", label.label_text);
    println!("{:<18} {} mm", "Font size", result.font_size);
    println!(
        "{:<18} {:.1} x {:.1} mm ({}, {})",
        "Text size (calc.)",
        result.text_width,
        result.text_height,
        result.precision,
        result.measurer
    );
    println!(
        "{:<18} {} x {} mm",
        "Label size", result.label_width, result.label_height
    );
}

fn print_layers(label: &LabelSpec, mode: RenderMode) -> Result<(), LabelError> {
    let layers = compose_layers(label)?;
    let palette = magnetic_label::PreviewPalette::from_spec(label);
    println!("{:<11} {:<7} {:>8} {:>10}  color", "layer", "group", "z", "thickness");
    for r in magnetic_label::select_renderables(&layers, mode, &palette) {
        let group = match r.layer.color_group() {
            magnetic_label::ColorGroup::Color1 => "color1",
            magnetic_label::ColorGroup::Color2 => "color2",
        };
        println!(
            "{:<11} {:<7} {:>8.2} {:>10.2}  {}",
            r.layer.kind.name(),
            group,
            r.layer.z_offset,
            r.layer.thickness,
            r.color.unwrap_or("-")
        );
    }
    println!("total thickness {:.2} mm", label.total_thickness());
    Ok(())
}

/// Ask a yes/no question on the terminal; the default is yes.
fn confirm(question: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("{question} needs an answer; pass --yes to accept without asking");
    }
    print!("{question} [Y/n] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(parse_answer(&answer))
}

fn parse_answer(answer: &str) -> bool {
    !matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no")
}

fn is_scad(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "scad")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_means_yes() {
        assert!(parse_answer("\n"));
        assert!(parse_answer("Y"));
        assert!(!parse_answer(" no "));
    }

    #[test]
    fn config_errors_exit_with_two() {
        let err = anyhow::Error::from(LabelError::from(ConfigError::InvalidMagnetCount(3)));
        assert_eq!(exit_code(&err), 2);
        let err = anyhow::Error::from(BackendError::NotFound);
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn cli_parses_export_flags() {
        let cli = Cli::try_parse_from([
            "magnetic-label",
            "export",
            "--text",
            "ASA",
            "--auto-size",
            "--yes",
        ])
        .unwrap();
        match cli.command {
            Command::Export { spec, auto_size, yes, .. } => {
                assert_eq!(spec.text.as_deref(), Some("ASA"));
                assert!(auto_size && yes);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["magnetic-label", "layers", "--mode", "color3"]).is_err());
    }
}
