use chrono::NaiveDate;
use fleet_scheduler::{
    load_fleet_from_json, load_roster_from_csv, save_fleet_to_json, save_roster_to_csv,
    AvailabilityQuery, BookingInterval, BusinessUnit, Equipment, EquipmentCategory,
    EquipmentFilter, EquipmentStatus, Granularity, RentalRequest, RequestStage, SchedulingEngine,
    TransitionAction, Urgency,
};
use std::io::{self, Write};

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if ci < widths.len() && cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push('|');
    for (i, name) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        out.push_str(&" ".repeat(widths[i] - name.len()));
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row in rows {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn equipment_rows(units: &[Equipment]) -> Vec<Vec<String>> {
    units
        .iter()
        .map(|unit| {
            vec![
                unit.id.clone(),
                unit.category.to_string(),
                unit.business_unit.to_string(),
                unit.status.to_string(),
                unit.location.clone(),
            ]
        })
        .collect()
}

fn print_equipment(units: &[Equipment]) {
    println!(
        "{}",
        render_table(
            &["id", "category", "business_unit", "status", "location"],
            &equipment_rows(units),
        )
    );
}

fn print_requests(requests: &[RentalRequest]) {
    let rows: Vec<Vec<String>> = requests
        .iter()
        .map(|request| {
            let assigned = request
                .assignments
                .iter()
                .map(|a| a.equipment_id.clone())
                .collect::<Vec<_>>()
                .join(",");
            vec![
                request.id.to_string(),
                request.category.to_string(),
                request.quantity.to_string(),
                request.business_unit.to_string(),
                request.project.clone(),
                request.interval.to_string(),
                request.urgency.to_string(),
                request.stage.to_string(),
                assigned,
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(
            &[
                "id", "category", "qty", "business_unit", "project", "interval", "urgency",
                "stage", "assigned",
            ],
            &rows,
        )
    );
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  equipment list                     Show the equipment roster\n  equipment add <id> <category> <bu> <location...>\n                                     Register a unit (starts available)\n  equipment status <id> <status>     Set status (available|on_rent|maintenance|out_of_service)\n  bookings <equipment_id>            Show committed intervals for a unit\n  request list [stage]               Show requests, optionally one stage\n  request add <id> <category> <qty> <bu> <start> <end> <by> <urgency> <project...>\n                                     Create a request (dates YYYY-MM-DD)\n  transition <id> <action>           approve|pass_inspection|dispatch|complete|reject|cancel\n  assign <id> <equipment_id> [start end]\n                                     Assign a unit, optionally narrowed\n  release <id> <equipment_id>        Release a unit back to the pool\n  avail <category> <start> <end> <qty> [bu]\n                                     Rank available units for a window\n  timeline <week|month|quarter> <start> <end> <ids_csv>\n                                     Project busy/free buckets per unit\n  today <YYYY-MM-DD>                 Pin the engine's reference date\n  save <json|csv> <path>             Persist fleet state (csv: roster only)\n  load <json|csv> <path>             Load fleet state (csv: roster only)\n  quit|exit                          Exit"
    );
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

fn parse_interval(start: &str, end: &str) -> Option<BookingInterval> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    BookingInterval::new(start, end).ok()
}

fn main() {
    let mut engine = SchedulingEngine::new();

    println!("Fleet Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "equipment" => match parts.next() {
                Some("list") | None => {
                    print_equipment(&engine.list_equipment(&EquipmentFilter::default()));
                }
                Some("add") => {
                    let id = parts.next();
                    let category = parts.next().and_then(EquipmentCategory::from_str);
                    let business_unit = parts.next().and_then(BusinessUnit::from_str);
                    let location: Vec<&str> = parts.collect();
                    match (id, category, business_unit, !location.is_empty()) {
                        (Some(id), Some(category), Some(business_unit), true) => {
                            let unit =
                                Equipment::new(id, category, business_unit, location.join(" "));
                            match engine.add_equipment(unit) {
                                Ok(_) => {
                                    println!("Equipment registered.");
                                    print_equipment(
                                        &engine.list_equipment(&EquipmentFilter::default()),
                                    );
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: equipment add <id> <category> <bu> <location...>"),
                    }
                }
                Some("status") => {
                    let id = parts.next();
                    let status = parts.next().and_then(EquipmentStatus::from_str);
                    match (id, status) {
                        (Some(id), Some(status)) => {
                            match engine.set_equipment_status(id, status) {
                                Ok(_) => println!("Status set."),
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: equipment status <id> <status>"),
                    }
                }
                Some(other) => {
                    println!("Unknown equipment command '{}'.", other);
                    println!("Usage: equipment list|add|status ...");
                }
            },
            "bookings" => match parts.next() {
                Some(id) => {
                    let rows: Vec<Vec<String>> = engine
                        .booking_entries(id)
                        .iter()
                        .map(|entry| {
                            vec![entry.request_id.to_string(), entry.interval.to_string()]
                        })
                        .collect();
                    println!("{}", render_table(&["request", "interval"], &rows));
                }
                None => println!("Usage: bookings <equipment_id>"),
            },
            "request" => match parts.next() {
                Some("list") | None => {
                    let stage = parts.next().and_then(RequestStage::from_str);
                    print_requests(&engine.list_requests(stage));
                }
                Some("add") => {
                    let id = parts.next().and_then(|s| s.parse::<i32>().ok());
                    let category = parts.next().and_then(EquipmentCategory::from_str);
                    let quantity = parts.next().and_then(|s| s.parse::<u32>().ok());
                    let business_unit = parts.next().and_then(BusinessUnit::from_str);
                    let start = parts.next();
                    let end = parts.next();
                    let requested_by = parts.next();
                    let urgency = parts.next().and_then(Urgency::from_str);
                    let project: Vec<&str> = parts.collect();
                    match (
                        id,
                        category,
                        quantity,
                        business_unit,
                        start,
                        end,
                        requested_by,
                        urgency,
                        !project.is_empty(),
                    ) {
                        (
                            Some(id),
                            Some(category),
                            Some(quantity),
                            Some(business_unit),
                            Some(start),
                            Some(end),
                            Some(requested_by),
                            Some(urgency),
                            true,
                        ) => {
                            let Some(interval) = parse_interval(start, end) else {
                                println!("Invalid date range (YYYY-MM-DD, start before end)");
                                continue;
                            };
                            let request = RentalRequest::new(
                                id,
                                category,
                                quantity,
                                business_unit,
                                project.join(" "),
                                interval,
                                requested_by,
                                urgency,
                            );
                            match engine.create_request(request) {
                                Ok(_) => {
                                    println!("Request created.");
                                    print_requests(&engine.list_requests(None));
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!(
                            "Usage: request add <id> <category> <qty> <bu> <start> <end> <by> <urgency> <project...>"
                        ),
                    }
                }
                Some(other) => {
                    println!("Unknown request command '{}'.", other);
                    println!("Usage: request list|add ...");
                }
            },
            "transition" => {
                let id = parts.next().and_then(|s| s.parse::<i32>().ok());
                let action = parts.next().and_then(TransitionAction::from_str);
                match (id, action) {
                    (Some(id), Some(action)) => match engine.transition(id, action) {
                        Ok(request) => {
                            println!("Request {} is now {}.", request.id, request.stage);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: transition <id> <action>"),
                }
            }
            "assign" => {
                let id = parts.next().and_then(|s| s.parse::<i32>().ok());
                let equipment_id = parts.next();
                let start = parts.next();
                let end = parts.next();
                match (id, equipment_id) {
                    (Some(id), Some(equipment_id)) => {
                        let narrowed = match (start, end) {
                            (Some(start), Some(end)) => match parse_interval(start, end) {
                                Some(interval) => Some(interval),
                                None => {
                                    println!("Invalid narrowed range (YYYY-MM-DD)");
                                    continue;
                                }
                            },
                            (None, None) => None,
                            _ => {
                                println!("Usage: assign <id> <equipment_id> [start end]");
                                continue;
                            }
                        };
                        match engine.assign(id, equipment_id, narrowed) {
                            Ok(assignment) => {
                                println!(
                                    "Assigned '{}' to request {} for {}.",
                                    assignment.equipment_id, assignment.request_id,
                                    assignment.interval
                                );
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: assign <id> <equipment_id> [start end]"),
                }
            }
            "release" => {
                let id = parts.next().and_then(|s| s.parse::<i32>().ok());
                let equipment_id = parts.next();
                match (id, equipment_id) {
                    (Some(id), Some(equipment_id)) => match engine.release(id, equipment_id) {
                        Ok(_) => println!("Released '{}' from request {}.", equipment_id, id),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: release <id> <equipment_id>"),
                }
            }
            "avail" => {
                let category = parts.next().and_then(EquipmentCategory::from_str);
                let start = parts.next();
                let end = parts.next();
                let quantity = parts.next().and_then(|s| s.parse::<u32>().ok());
                let business_unit = parts.next().and_then(BusinessUnit::from_str);
                match (category, start, end, quantity) {
                    (Some(category), Some(start), Some(end), Some(quantity)) => {
                        let Some(interval) = parse_interval(start, end) else {
                            println!("Invalid date range (YYYY-MM-DD, start before end)");
                            continue;
                        };
                        let query = AvailabilityQuery {
                            category,
                            interval,
                            business_unit,
                            quantity,
                        };
                        match engine.check_availability(&query) {
                            Ok(availability) => {
                                if availability.is_partial() {
                                    println!(
                                        "Partial availability: {} of {} units.",
                                        availability.units().len(),
                                        quantity
                                    );
                                }
                                print_equipment(availability.units());
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: avail <category> <start> <end> <qty> [bu]"),
                }
            }
            "timeline" => {
                let granularity = parts.next().and_then(Granularity::from_str);
                let start = parts.next();
                let end = parts.next();
                let ids = parts.next();
                match (granularity, start, end, ids) {
                    (Some(granularity), Some(start), Some(end), Some(ids)) => {
                        let Some(range) = parse_interval(start, end) else {
                            println!("Invalid date range (YYYY-MM-DD, start before end)");
                            continue;
                        };
                        let equipment_ids: Vec<String> =
                            ids.split(',').map(|s| s.trim().to_string()).collect();
                        match engine.timeline(&equipment_ids, granularity, &range) {
                            Ok(timelines) => {
                                for timeline in timelines {
                                    println!("{}:", timeline.equipment_id);
                                    let rows: Vec<Vec<String>> = timeline
                                        .buckets
                                        .iter()
                                        .map(|bucket| {
                                            vec![
                                                bucket.start.to_string(),
                                                bucket.end.to_string(),
                                                if bucket.busy { "busy" } else { "free" }
                                                    .to_string(),
                                                bucket
                                                    .request_id
                                                    .map(|id| id.to_string())
                                                    .unwrap_or_default(),
                                            ]
                                        })
                                        .collect();
                                    println!(
                                        "{}",
                                        render_table(
                                            &["start", "end", "state", "request"],
                                            &rows
                                        )
                                    );
                                }
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: timeline <week|month|quarter> <start> <end> <ids_csv>"),
                }
            }
            "today" => match parts.next().and_then(parse_date) {
                Some(date) => {
                    engine.set_reference_date(date);
                    println!("Reference date set to {}.", date);
                }
                None => println!("Usage: today <YYYY-MM-DD>"),
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_fleet_to_json(&engine, path) {
                        Ok(_) => println!("Fleet state saved to {}.", path),
                        Err(e) => println!("Error saving fleet state: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_roster_to_csv(&engine, path) {
                        Ok(_) => println!("Equipment roster saved to {}.", path),
                        Err(e) => println!("Error saving roster: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_fleet_from_json(path) {
                        Ok(loaded) => {
                            engine = loaded;
                            println!("Fleet state loaded from {}.", path);
                            print_requests(&engine.list_requests(None));
                        }
                        Err(e) => println!("Error loading fleet state: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_roster_from_csv(path) {
                        Ok(roster) => {
                            let fresh = SchedulingEngine::new();
                            let mut failed = false;
                            for unit in roster {
                                if let Err(e) = fresh.add_equipment(unit) {
                                    println!("Error loading roster: {}", e);
                                    failed = true;
                                    break;
                                }
                            }
                            if !failed {
                                engine = fresh;
                                println!("Equipment roster loaded from {}.", path);
                                print_equipment(
                                    &engine.list_equipment(&EquipmentFilter::default()),
                                );
                            }
                        }
                        Err(e) => println!("Error loading roster: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
