//! Interactive schedule input: `HH:MM` or `start now`.
//!
//! The core only accepts a parsed `ScheduleSpec`; all raw-text handling
//! lives here.

use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};
use strec_core::schedule::ScheduleSpec;

/// Parses `HH:MM` (24-hour) or `start now` / `now`.
pub fn parse_schedule_input(input: &str) -> Result<ScheduleSpec> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("start now") || trimmed.eq_ignore_ascii_case("now") {
        return Ok(ScheduleSpec::Immediate);
    }

    let (hour_str, minute_str) = trimmed
        .split_once(':')
        .ok_or_else(|| anyhow!("expected HH:MM or 'start now'"))?;
    let hour: u32 = hour_str
        .trim()
        .parse()
        .map_err(|_| anyhow!("hour is not a number: {:?}", hour_str))?;
    let minute: u32 = minute_str
        .trim()
        .parse()
        .map_err(|_| anyhow!("minute is not a number: {:?}", minute_str))?;

    Ok(ScheduleSpec::at(hour, minute)?)
}

/// Prompts on stdin until a valid schedule arrives. EOF means start now
/// rather than looping forever on a closed input.
pub fn prompt_for_schedule() -> Result<ScheduleSpec> {
    let stdin = io::stdin();
    loop {
        print!("Start time (HH:MM, 24-hour) or 'start now': ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(ScheduleSpec::Immediate);
        }
        match parse_schedule_input(&line) {
            Ok(spec) => return Ok(spec),
            Err(err) => println!("Invalid input: {}. Try e.g. 09:30 or 'start now'.", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_now() {
        assert_eq!(
            parse_schedule_input("start now").unwrap(),
            ScheduleSpec::Immediate
        );
        assert_eq!(
            parse_schedule_input("  Start NOW ").unwrap(),
            ScheduleSpec::Immediate
        );
        assert_eq!(parse_schedule_input("now").unwrap(), ScheduleSpec::Immediate);
    }

    #[test]
    fn parses_wall_clock_times() {
        assert_eq!(
            parse_schedule_input("09:30").unwrap(),
            ScheduleSpec::At { hour: 9, minute: 30 }
        );
        assert_eq!(
            parse_schedule_input("0:0").unwrap(),
            ScheduleSpec::At { hour: 0, minute: 0 }
        );
        assert_eq!(
            parse_schedule_input(" 23:59 ").unwrap(),
            ScheduleSpec::At { hour: 23, minute: 59 }
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_schedule_input("24:00").is_err());
        assert!(parse_schedule_input("12:60").is_err());
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_schedule_input("0930").is_err());
        assert!(parse_schedule_input("nine:thirty").is_err());
        assert!(parse_schedule_input(":").is_err());
        assert!(parse_schedule_input("").is_err());
    }
}
