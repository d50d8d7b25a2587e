//! This module is in charge of outputting the final analysis results to the
//! standard output and to a report file

use crate::{analysis::FinalResults, config::Configuration};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    time::Duration,
};

// Number of significant digits of efficiencies
const SIG_DIGITS: usize = 6;

/// Output the analysis results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    res_fin: &FinalResults,
    elapsed_time: Duration,
) -> eyre::Result<()> {
    // Print out the headline numbers on stdout
    println!();
    println!("{}", res_fin.tally);
    println!(
        "nr eles pass {} N-1 : {} / {}",
        cfg.n_minus_one_cuts.join(","),
        res_fin.nr_n_minus_one_pass,
        res_fin.tally.total()
    );
    if res_fin.nr_inconsistent != 0 {
        println!(
            "nr eles with inconsistent bitmap : {}",
            res_fin.nr_inconsistent
        );
    }

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;

    // Write the report
    let mut report = BufWriter::new(File::create(&cfg.report)?);
    write_report(&mut report, cfg, res_fin, &timestamp, elapsed_time)?;
    report.flush()?;

    // ...and we're done
    Ok(())
}

/// Write down the full report of a run
fn write_report(
    out: &mut impl Write,
    cfg: &Configuration,
    res_fin: &FinalResults,
    timestamp: &str,
    elapsed_time: Duration,
) -> io::Result<()> {
    // Shorthands
    let tally = res_fin.tally;
    let list = |cuts: &[String]| {
        if cuts.is_empty() {
            "(all)".to_owned()
        } else {
            cuts.join(",")
        }
    };

    // Run description
    writeln_report(out, timestamp)?;
    writeln_report(out, ("Cut flow", res_fin.registry.name()))?;
    writeln_report(out, ("Input", cfg.input.as_str()))?;
    let elapsed_secs = elapsed_time.as_secs_f64();
    writeln_report(out, ("Analysis time (s)", elapsed_secs))?;
    writeln_report(out, "---------------------------------------------")?;

    // Selection summary
    writeln_report(out, ("Candidates", tally.total()))?;
    writeln_report(out, ("... passing", tally.nr_pass()))?;
    writeln_report(out, ("Efficiency", res_fin.efficiency))?;
    let required = list(&cfg.required_cuts);
    writeln_report(out, ("Required cuts", required.as_str()))?;
    writeln_report(out, ("... passing", res_fin.nr_subset_pass))?;
    writeln_report(out, ("Efficiency", res_fin.subset_efficiency))?;
    let n_minus_one = list(&cfg.n_minus_one_cuts);
    writeln_report(out, ("N-1 ignored cuts", n_minus_one.as_str()))?;
    writeln_report(out, ("... passing", res_fin.nr_n_minus_one_pass))?;
    writeln_report(out, ("Efficiency", res_fin.n_minus_one_efficiency))?;
    writeln_report(out, ("Inconsistent bitmaps", res_fin.nr_inconsistent))?;
    writeln_report(out, "---------------------------------------------")?;

    // Cut-by-cut table
    writeln!(
        out,
        "{:>3} {:<15}{:>10}{:>14}{:>14}",
        "#", "cut", "passing", "efficiency", "first fail"
    )?;
    for (index, cut) in res_fin.cuts.iter().enumerate() {
        write!(
            out,
            "{:>3} {:<15}{:>10}{:>14}",
            index,
            cut.name,
            cut.nr_pass,
            engineering(cut.efficiency, SIG_DIGITS)
        )?;
        writeln!(out, "{:>14}", cut.nr_first_failed)?;
    }
    Ok(())
}

/// Text output facility for key-value report lines
fn writeln_report(out: &mut impl Write, data: impl WriteReport) -> io::Result<()> {
    write!(out, " ")?;
    data.write(out)?;
    writeln!(out)
}

/// Trait implemented by things which can be printed in the report
trait WriteReport: Sized {
    /// Write down `self` to the report
    fn write(self, out: &mut impl Write) -> io::Result<()>;
}

impl WriteReport for &str {
    // Strings work in the usual way
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteReport for usize {
    // Integers work in the usual way too
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl WriteReport for f64 {
    // Floats are printed with a fixed number of significant digits
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", engineering(self, SIG_DIGITS))
    }
}

impl<T: WriteReport> WriteReport for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{:<31}: ", self.0)?;
        self.1.write(out)
    }
}

/// Format a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn engineering(x: f64, sig_digits: usize) -> String {
    let precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        return "0".to_owned();
    }

    // Otherwise, use log to evaluate order of magnitude
    let log_x = x.abs().log10();
    if log_x >= -3. && log_x <= (sig_digits as f64) {
        // Since Rust's precision controls number of digits after the decimal
        // point, we must adjust it depending on magnitude in order to operate
        // at a constant number of significant digits. Numbers smaller than 1
        // get one extra digit since the leading zero is not significant.
        let mut precision = (precision as isize - log_x.trunc() as isize).max(0) as usize;
        if log_x < 0. {
            precision += 1
        }

        // People don't normally expect trailing zeros or decimal point in
        // naive notation, but be careful with integer numbers...
        let str_with_zeros = format!("{:.1$}", x, precision);
        if str_with_zeros.contains('.') {
            str_with_zeros
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_owned()
        } else {
            str_with_zeros
        }
    } else {
        // Print using scientific notation
        format!("{:.1$e}", x, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0., 6), "0");
        assert_eq!(engineering(1., 6), "1");
        assert_eq!(engineering(0.25, 6), "0.25");
        assert_eq!(engineering(2. / 3., 6), "0.666667");
        assert_eq!(engineering(1e-5, 6), "1.00000e-5");
    }

    #[test]
    fn key_value_lines() {
        let mut out = Vec::new();
        writeln_report(&mut out, ("Candidates", 42usize)).unwrap();
        writeln_report(&mut out, ("Efficiency", 0.5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!(" {:<31}: 42\n {:<31}: 0.5\n", "Candidates", "Efficiency")
        );
    }
}
