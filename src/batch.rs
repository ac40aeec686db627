//! Batch lookups over a delimited file of MAC addresses.

use crate::errors::*;
use crate::resolver::Resolver;
use std::io::{Read, Write};
use tracing::debug;

const BOM: char = '\u{feff}';

/// Per-address result. Only errors that make further lookups pointless
/// (a broken cache, I/O) escape as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(String),
    NotFound,
    Invalid,
}

pub fn resolve(resolver: &mut Resolver, raw: &str) -> Result<Outcome> {
    match resolver.lookup(raw) {
        Ok(vendor) => Ok(Outcome::Found(vendor)),
        Err(Error(ErrorKind::VendorNotFound(_), _)) => Ok(Outcome::NotFound),
        Err(e @ Error(ErrorKind::InvalidAddress(..), _)) => {
            debug!(mac = raw, "{}", e);
            Ok(Outcome::Invalid)
        }
        Err(e) => Err(e),
    }
}

/// First field of every non-blank row, with a leading byte-order mark dropped.
pub fn read_addresses<R: Read>(input: R) -> impl Iterator<Item = Result<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
        .into_records()
        .filter_map(|record| {
            let record = match record {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            let field = record.get(0).unwrap_or("").trim_start_matches(BOM).trim();
            if field.is_empty() {
                None
            } else {
                Some(Ok(field.to_string()))
            }
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One human readable line per address.
    Console,
    /// `MAC Address,Vendor` table with a header row.
    Csv,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub found: usize,
    pub not_found: usize,
    pub invalid: usize,
}

pub fn run<R, W>(resolver: &mut Resolver, input: R, out: &mut W, format: Format) -> Result<Summary>
where
    R: Read,
    W: Write,
{
    let mut summary = Summary::default();
    let mut report = Report::new(out, format)?;

    for mac in read_addresses(input) {
        let mac = mac?;
        let outcome = resolve(resolver, &mac)?;
        match outcome {
            Outcome::Found(_) => summary.found += 1,
            Outcome::NotFound => summary.not_found += 1,
            Outcome::Invalid => summary.invalid += 1,
        }
        report.row(&mac, &outcome)?;
    }

    report.finish()?;
    Ok(summary)
}

enum Report<'a, W: Write> {
    Console(&'a mut W),
    Csv(csv::Writer<&'a mut W>),
}

impl<'a, W: Write> Report<'a, W> {
    fn new(out: &'a mut W, format: Format) -> Result<Self> {
        match format {
            Format::Console => Ok(Report::Console(out)),
            Format::Csv => {
                let mut writer = csv::WriterBuilder::new()
                    .terminator(csv::Terminator::Any(b'\n'))
                    .from_writer(out);
                writer.write_record(["MAC Address", "Vendor"])?;
                Ok(Report::Csv(writer))
            }
        }
    }

    fn row(&mut self, mac: &str, outcome: &Outcome) -> Result<()> {
        match *self {
            Report::Console(ref mut out) => match *outcome {
                Outcome::Found(ref vendor) => writeln!(out, "{} : {}", mac, vendor)?,
                Outcome::NotFound => writeln!(out, "{} has not been found in the vendor list", mac)?,
                Outcome::Invalid => writeln!(out, "{} is not a valid MAC address", mac)?,
            },
            Report::Csv(ref mut writer) => {
                let vendor = match *outcome {
                    Outcome::Found(ref vendor) => vendor.as_str(),
                    Outcome::NotFound => "Not Found",
                    Outcome::Invalid => "Invalid MAC",
                };
                writer.write_record([mac, vendor])?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        match self {
            Report::Console(out) => out.flush()?,
            Report::Csv(mut writer) => writer.flush()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(input: &str) -> Vec<String> {
        read_addresses(input.as_bytes()).map(|m| m.unwrap()).collect()
    }

    #[test]
    fn reads_first_fields() {
        let input = "\u{feff}00:00:0C:11:22:33,office\n\n\"00-1B-63-84-45-E6\",lab\r\n  aabb.ccdd.eeff  \n";
        assert_eq!(addresses(input), vec!["00:00:0C:11:22:33", "00-1B-63-84-45-E6", "aabb.ccdd.eeff"]);
    }

    #[test]
    fn quoted_field_keeps_embedded_comma() {
        assert_eq!(addresses("\"00:00:0C:11:22:33, desk\",lab\n"), vec!["00:00:0C:11:22:33, desk"]);
    }

    #[test]
    fn rows_may_differ_in_width() {
        assert_eq!(addresses("00000C112233\n001B638445E6,lab,rack 4\n"), vec!["00000C112233", "001B638445E6"]);
    }
}
