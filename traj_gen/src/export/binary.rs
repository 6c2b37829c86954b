//! Binary `.traj` trajectory files
//!
//! All values are big endian. The file starts with the segment count as a
//! 4 byte signed integer, followed by every segment as eight 8 byte floats
//! in the order dt, x, y, position, velocity, acceleration, jerk, heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::{
    convert::TryFrom,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    error::ProfileError,
    profile::{ProfileElement, Segment, Trajectory},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Size of the segment count header.
const HEADER_BYTES: u64 = 4;

/// Size of one segment, eight doubles.
const SEGMENT_BYTES: u64 = 64;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Write a trajectory to a binary `.traj` file.
pub fn write_traj(path: &Path, traj: &Trajectory) -> Result<(), ProfileError> {
    let count = i32::try_from(traj.len()).map_err(|_| {
        ProfileError::InvalidArgument(format!(
            "Trajectory with {} segments is too long for a .traj file",
            traj.len()
        ))
    })?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_i32::<BigEndian>(count)?;

    for seg in traj.segments() {
        for element in ProfileElement::ALL.iter() {
            writer.write_f64::<BigEndian>(seg.element(*element))?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read the segments of a binary `.traj` file.
///
/// The segment count in the header must match the size of the file.
pub fn read_traj(path: &Path) -> Result<Vec<Segment>, ProfileError> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let count = reader.read_i32::<BigEndian>()?;
    let count = usize::try_from(count).map_err(|_| {
        ProfileError::ParseFailure(format!("Negative segment count {} in {:?}", count, path))
    })?;

    let expected_len = HEADER_BYTES + SEGMENT_BYTES * count as u64;
    if file_len != expected_len {
        return Err(ProfileError::ParseFailure(format!(
            "{:?} is {} bytes long but its header gives {} segments ({} bytes)",
            path, file_len, count, expected_len
        )));
    }

    let mut segments = Vec::with_capacity(count);
    let mut values = [0f64; 8];

    for _ in 0..count {
        reader.read_f64_into::<BigEndian>(&mut values)?;

        segments.push(Segment {
            dt: values[0],
            x: values[1],
            y: values[2],
            position: values[3],
            velocity: values[4],
            acceleration: values[5],
            jerk: values[6],
            heading: values[7],
        });
    }

    Ok(segments)
}
