use std::fmt::Write as _;

use geocodio_core::{BatchResponse, Candidate, Fields, GeocodeResult};

pub fn print_result(result: &GeocodeResult, raw: bool) {
    if raw {
        println!("{}", result.response_as_str());
        return;
    }

    print!("{}", format_result(result));
}

pub fn print_batch(batch: &BatchResponse, raw: bool) {
    if raw {
        println!("{}", batch.response_as_str());
        return;
    }

    for entry in batch.iter() {
        println!("Query: {}", entry.query);
        if let Some(error) = &entry.response.error {
            println!("  (error: {error})");
        } else if entry.response.is_empty() {
            println!("  (no results)");
        } else {
            print!("{}", format_result(&entry.response));
        }
    }
}

fn format_result(result: &GeocodeResult) -> String {
    let mut out = String::new();
    for (i, candidate) in result.results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, candidate.formatted_address);
        write_candidate(&mut out, candidate);
    }
    out
}

fn write_candidate(out: &mut String, candidate: &Candidate) {
    let _ = writeln!(
        out,
        "   location: {:.6}, {:.6}  (accuracy {:.2}, {})",
        candidate.location.latitude,
        candidate.location.longitude,
        candidate.accuracy,
        candidate.accuracy_type,
    );
    write_fields(out, &candidate.fields);
}

fn write_fields(out: &mut String, fields: &Fields) {
    if let Some(tz) = &fields.timezone {
        let dst = if tz.observes_dst { ", observes DST" } else { "" };
        let _ = writeln!(out, "   timezone: {} (UTC{:+}{dst})", tz.name, tz.utc_offset);
    }
    if let Some(zip4) = &fields.zip4 {
        let _ = writeln!(out, "   zip+4: {}", zip4.plus4.join(", "));
    }
    if let Some(cd) = fields.district() {
        let _ = writeln!(out, "   congressional district: {} ({})", cd.name, cd.congress_number);
    }
    if let Some(stateleg) = &fields.state_legislative_districts {
        let _ = writeln!(
            out,
            "   state house: {} / state senate: {}",
            stateleg.house.name, stateleg.senate.name
        );
    }
}
