use crate::io::{Format, error::Error};
use crate::model::frame::{Atom, Frame};
use std::io::BufRead;
use tracing::debug;

pub fn read<R: BufRead>(reader: R) -> Result<Vec<Frame>, Error> {
    let lines = collect_lines(reader)?;
    let mut frames = Vec::new();
    let mut cursor = 0;

    while let Some((count_line_no, count_line)) = next_non_blank(&lines, &mut cursor) {
        let declared = parse_count(count_line).ok_or_else(|| {
            Error::parse(
                Format::Xyz,
                count_line_no,
                "expected an atom count at the start of a frame",
            )
        })?;

        let comment = match lines.get(cursor) {
            Some((_, line)) => {
                cursor += 1;
                line.trim_start().to_string()
            }
            None => {
                return Err(Error::parse(
                    Format::Xyz,
                    count_line_no,
                    "frame ends before its comment line",
                ));
            }
        };

        let atoms = read_atoms(&lines, &mut cursor)?;
        if atoms.len() != declared {
            return Err(Error::CountMismatch {
                frame: frames.len() + 1,
                line: count_line_no,
                declared,
                found: atoms.len(),
            });
        }

        frames.push(Frame::new(comment, atoms));
    }

    debug!(frames = frames.len(), "parsed XYZ frames");
    Ok(frames)
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|v| (i + 1, v))
                .map_err(|e| Error::Io { source: e })
        })
        .collect()
}

fn next_non_blank<'a>(lines: &'a [(usize, String)], cursor: &mut usize) -> Option<(usize, &'a str)> {
    while let Some((ln, line)) = lines.get(*cursor) {
        *cursor += 1;
        if !line.trim().is_empty() {
            return Some((*ln, line));
        }
    }
    None
}

fn parse_count(line: &str) -> Option<usize> {
    line.trim().parse::<usize>().ok()
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Reads atom lines up to the next count line or the end of input.
fn read_atoms(lines: &[(usize, String)], cursor: &mut usize) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::new();
    while let Some((ln, line)) = lines.get(*cursor) {
        if parse_count(line).is_some() {
            break;
        }
        *cursor += 1;
        if is_skippable(line) {
            continue;
        }
        atoms.push(parse_atom(line, *ln)?);
    }
    Ok(atoms)
}

fn parse_atom(line: &str, line_no: usize) -> Result<Atom, Error> {
    let parts: Vec<_> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            "atom line must have a symbol and three coordinates",
        ));
    }

    let symbol = parts[0];
    if !symbol.starts_with(|c: char| c.is_ascii_alphabetic())
        || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(Error::parse(
            Format::Xyz,
            line_no,
            format!("invalid atom symbol '{symbol}'"),
        ));
    }

    let mut position = [0.0; 3];
    for (axis, (slot, token)) in position.iter_mut().zip(&parts[1..4]).enumerate() {
        *slot = token.parse::<f64>().map_err(|_| {
            Error::parse(
                Format::Xyz,
                line_no,
                format!("invalid {} coordinate '{token}'", ["x", "y", "z"][axis]),
            )
        })?;
    }

    Ok(Atom::new(symbol, position))
}
