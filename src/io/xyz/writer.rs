use crate::io::error::Error;
use crate::model::frame::Frame;
use std::io::Write;

pub fn write<W: Write>(mut writer: W, frames: &[Frame]) -> Result<(), Error> {
    for frame in frames {
        write_frame(&mut writer, frame)?;
    }
    Ok(())
}

pub fn write_frame<W: Write>(mut writer: W, frame: &Frame) -> Result<(), Error> {
    writeln!(writer, "{:>8}", frame.atom_count())?;
    writeln!(writer, " {}", frame.comment)?;
    for atom in &frame.atoms {
        let [x, y, z] = atom.position;
        writeln!(writer, " {:>2} {x:>20.10}{y:>20.10}{z:>20.10}", atom.symbol)?;
    }
    Ok(())
}
