//! Catalog ingestion boundary.
//!
//! The data-cleaning collaborator hands over CSV rows already filtered to
//! the LEO range:
//!
//! `EPOCH,INCLINATION,RA_OF_ASC_NODE,ARG_OF_PERICENTER,MEAN_ANOMALY,ID,SEMIMAJOR_AXIS,OBJECT_TYPE,RCS_SIZE,LAUNCH_TIME`
//!
//! with times in seconds, angles in degrees and the semimajor axis in
//! meters. Degrees become radians here, once; nothing past this point ever
//! converts units again. Out-of-range or non-finite records are rejected
//! with an `InvalidBodyError` so the core never sees them.

use std::io::BufRead;

use crate::{
    body::{BodyId, Elements, ObjectClass, OrbitingBody, SizeClass},
    errors::InvalidBodyError,
    shells::ShellIndex,
    units::{Angle, Length, Timestamp},
};

pub fn bodies_from_csv<R: BufRead>(
    reader: R,
    shells: &ShellIndex,
) -> Result<Vec<OrbitingBody>, InvalidBodyError> {
    let mut bodies = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| InvalidBodyError::MalformedRecord {
            line: line_no,
            reason: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Header row.
        if idx == 0 && trimmed.starts_with("EPOCH") {
            continue;
        }
        bodies.push(parse_record(trimmed, line_no, shells)?);
    }
    Ok(bodies)
}

/// Largest id in the ingested catalog; the id allocator continues above it.
pub fn max_id(bodies: &[OrbitingBody]) -> Option<BodyId> {
    bodies.iter().map(|b| b.id).max()
}

fn parse_record(
    line: &str,
    line_no: usize,
    shells: &ShellIndex,
) -> Result<OrbitingBody, InvalidBodyError> {
    let malformed = |reason: String| InvalidBodyError::MalformedRecord {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 10 {
        return Err(malformed(format!(
            "expected 10 fields, found {}",
            fields.len()
        )));
    }

    let num = |i: usize, name: &str| -> Result<f64, InvalidBodyError> {
        fields[i]
            .parse::<f64>()
            .map_err(|_| malformed(format!("bad value '{}' for {name}", fields[i])))
    };

    let epoch = num(0, "EPOCH")?;
    let inclination = num(1, "INCLINATION")?;
    let ra_of_asc_node = num(2, "RA_OF_ASC_NODE")?;
    let arg_of_pericenter = num(3, "ARG_OF_PERICENTER")?;
    let mean_anomaly = num(4, "MEAN_ANOMALY")?;
    let id = fields[5]
        .parse::<u64>()
        .map_err(|_| malformed(format!("bad value '{}' for ID", fields[5])))?;
    let semimajor_axis = num(6, "SEMIMAJOR_AXIS")?;

    let object_class = match fields[7] {
        "SATELLITE" | "PAYLOAD" => ObjectClass::Satellite,
        "DEBRIS" | "ROCKET BODY" => ObjectClass::Debris,
        other => return Err(malformed(format!("unknown object type '{other}'"))),
    };
    let size_class = match fields[8] {
        "SMALL" => SizeClass::Small,
        "MEDIUM" => SizeClass::Medium,
        "LARGE" => SizeClass::Large,
        other => return Err(malformed(format!("unknown size class '{other}'"))),
    };
    let launch_time = num(9, "LAUNCH_TIME")?;

    OrbitingBody::new(
        BodyId::new(id),
        Elements {
            epoch: Timestamp::from_secs(epoch),
            semimajor_axis: Length::from_meters(semimajor_axis),
            // The one and only degrees-to-radians conversion.
            inclination: Angle::from_degrees(inclination),
            ra_of_ascending_node: Angle::from_degrees(ra_of_asc_node),
            argument_of_pericenter: Angle::from_degrees(arg_of_pericenter),
            mean_anomaly: Angle::from_degrees(mean_anomaly),
        },
        object_class,
        size_class,
        Timestamp::from_secs(launch_time),
        shells,
    )
}
