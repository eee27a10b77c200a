use chrono::NaiveDate;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use training_scheduler::{
    Course, ScheduleReport, SchedulingCriteria, SchedulingEngine, SchedulingMode,
    SchedulingPreference, SchedulingRequest, Trainee,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn render_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (ci, width) in widths.iter().enumerate() {
        let cell = cells.get(ci).copied().unwrap_or("");
        line.push(' ');
        line.push_str(cell);
        let pad = width.saturating_sub(cell.len());
        if pad > 0 {
            line.push_str(&" ".repeat(pad));
        }
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
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
    out.push_str(&render_row(&widths, headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&widths, &cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <path>                        Load a scheduling request (criteria, courses, trainees) from JSON\n  criteria show                      Print the current criteria as JSON\n  criteria load <path>               Replace the criteria from a JSON file\n  mode <group_complete|course_complete>\n                                     Set the scheduling mode\n  preference <both|morning_only|afternoon_only>\n                                     Set the time block preference\n  max <n>                            Set max attendees per session\n  start <YYYY-MM-DD>                 Set the start date\n  classrooms <location> <n>          Fix the classroom count for a location\n  course <id> <hours> <name...>      Add or replace a course\n  trainee <id> <location> <csv>      Add or replace a trainee (course ids like c1,c2)\n  courses                            List courses\n  trainees                           List trainees\n  estimate                           Show per-location classroom estimates\n  schedule                           Build the timetable\n  rows                               Print the last timetable as session rows (JSON)\n  warnings                           List warnings from the last run\n  quit|exit                          Exit"
    );
}

fn courses_table(courses: &[Course]) -> String {
    let rows: Vec<Vec<String>> = courses
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.name.clone(),
                c.duration_hours.to_string(),
                c.priority.to_string(),
                c.functional_area().to_string(),
            ]
        })
        .collect();
    render_text_table(&["id", "name", "hours", "priority", "area"], &rows)
}

fn trainees_table(trainees: &[Trainee]) -> String {
    let rows: Vec<Vec<String>> = trainees
        .iter()
        .map(|t| vec![t.id.clone(), t.location.clone(), t.courses.join(",")])
        .collect();
    render_text_table(&["id", "location", "courses"], &rows)
}

fn timetable_table(report: &ScheduleReport) -> String {
    let rows: Vec<Vec<String>> = report
        .timetable
        .chronological()
        .into_iter()
        .map(|p| {
            vec![
                p.start.format("%Y-%m-%d %H:%M").to_string(),
                p.end.format("%H:%M").to_string(),
                p.location.clone(),
                p.classroom.to_string(),
                p.course_id.clone(),
                p.session_group.to_string(),
                format!("{}/{}", p.part, p.total_parts),
                p.title.clone(),
            ]
        })
        .collect();
    render_text_table(
        &["start", "end", "location", "room", "course", "group", "part", "title"],
        &rows,
    )
}

fn upsert_course(courses: &mut Vec<Course>, course: Course) {
    match courses.iter_mut().find(|c| c.id == course.id) {
        Some(existing) => *existing = course,
        None => courses.push(course),
    }
}

fn upsert_trainee(trainees: &mut Vec<Trainee>, trainee: Trainee) {
    match trainees.iter_mut().find(|t| t.id == trainee.id) {
        Some(existing) => *existing = trainee,
        None => trainees.push(trainee),
    }
}

fn main() {
    init_tracing();

    let mut request = SchedulingRequest::default();
    let mut last_report: Option<ScheduleReport> = None;

    println!("Training Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
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
            "load" => match parts.next() {
                Some(path) => match SchedulingRequest::from_json_path(path) {
                    Ok(loaded) => {
                        println!(
                            "Request loaded from {} ({} courses, {} trainees).",
                            path,
                            loaded.courses.len(),
                            loaded.trainees.len()
                        );
                        request = loaded;
                        last_report = None;
                    }
                    Err(e) => println!("Load error: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "criteria" => match (parts.next(), parts.next()) {
                (Some("show"), _) => match serde_json::to_string_pretty(&request.criteria) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("Error: {}", e),
                },
                (Some("load"), Some(path)) => match SchedulingCriteria::from_json_path(path) {
                    Ok(criteria) => {
                        request.criteria = criteria;
                        println!("Criteria loaded from {}.", path);
                    }
                    Err(e) => println!("Load error: {}", e),
                },
                _ => println!("Usage: criteria show | criteria load <path>"),
            },
            "mode" => match parts.next().map(str::parse::<SchedulingMode>) {
                Some(Ok(mode)) => {
                    request.criteria.mode = mode;
                    println!("mode set to {}.", mode);
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: mode <group_complete|course_complete>"),
            },
            "preference" => match parts.next().map(str::parse::<SchedulingPreference>) {
                Some(Ok(preference)) => {
                    request.criteria.preference = preference;
                    println!("preference set to {}.", preference);
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: preference <both|morning_only|afternoon_only>"),
            },
            "max" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(max)) => {
                    request.criteria.max_attendees = max;
                    println!("max_attendees set to {}.", max);
                }
                Some(Err(_)) => println!("Invalid number"),
                None => println!("Usage: max <n>"),
            },
            "start" => match parts.next() {
                Some(date_s) => match NaiveDate::parse_from_str(date_s, "%Y-%m-%d") {
                    Ok(date) => {
                        request.criteria.start_date = date;
                        println!("start_date set to {}.", date);
                    }
                    Err(_) => println!("Invalid date (YYYY-MM-DD)"),
                },
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "classrooms" => match (parts.next(), parts.next()) {
                (Some(location), Some(n_s)) => match n_s.parse::<u32>() {
                    Ok(n) => {
                        request
                            .criteria
                            .classroom_overrides
                            .insert(location.to_string(), n);
                        println!("{} classroom(s) fixed for {}.", n, location);
                    }
                    Err(_) => println!("Invalid number"),
                },
                _ => println!("Usage: classrooms <location> <n>"),
            },
            "course" => {
                let id_s = parts.next();
                let hours_s = parts.next();
                let name: Vec<&str> = parts.collect();
                match (id_s, hours_s) {
                    (Some(id), Some(hours_s)) => {
                        let hours: f64 = match hours_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid hours");
                                continue;
                            }
                        };
                        let name = if name.is_empty() {
                            id.to_string()
                        } else {
                            name.join(" ")
                        };
                        upsert_course(&mut request.courses, Course::new(id, name, hours));
                        println!("Course {} upserted.", id);
                    }
                    _ => println!("Usage: course <id> <hours> <name...>"),
                }
            }
            "trainee" => match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(location), Some(csv)) => {
                    let courses = csv.split(',').map(str::trim).filter(|c| !c.is_empty());
                    upsert_trainee(&mut request.trainees, Trainee::new(id, location, courses));
                    println!("Trainee {} upserted.", id);
                }
                _ => println!("Usage: trainee <id> <location> <csv>"),
            },
            "courses" => println!("{}", courses_table(&request.courses)),
            "trainees" => println!("{}", trainees_table(&request.trainees)),
            "estimate" => {
                let engine = SchedulingEngine::new(request.criteria.clone());
                match engine.estimate_capacity(&request.trainees, &request.courses) {
                    Ok(estimates) => {
                        let rows: Vec<Vec<String>> = estimates
                            .iter()
                            .map(|e| {
                                vec![
                                    e.location.clone(),
                                    e.trainee_count.to_string(),
                                    e.session_groups.to_string(),
                                    format!("{:.1}", e.estimate.total_training_hours),
                                    e.estimate.number_of_classrooms.to_string(),
                                    e.classrooms.to_string(),
                                    e.assessment.severity.to_string(),
                                ]
                            })
                            .collect();
                        println!(
                            "{}",
                            render_text_table(
                                &["location", "trainees", "groups", "hours", "estimated", "classrooms", "severity"],
                                &rows
                            )
                        );
                    }
                    Err(e) => println!("Estimate error: {}", e),
                }
            }
            "schedule" => {
                let engine = SchedulingEngine::new(request.criteria.clone());
                match engine.schedule(&request.trainees, &request.courses) {
                    Ok(report) => {
                        println!(
                            "Scheduled ({})\n{}",
                            report.summary.to_cli_summary(),
                            timetable_table(&report)
                        );
                        last_report = Some(report);
                    }
                    Err(e) => println!("Schedule error: {}", e),
                }
            }
            "rows" => match &last_report {
                Some(report) => match serde_json::to_string_pretty(&report.rows()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Nothing scheduled yet. Run 'schedule' first."),
            },
            "warnings" => match &last_report {
                Some(report) if report.warnings.is_empty() => println!("No warnings."),
                Some(report) => {
                    for warning in &report.warnings {
                        println!("{}", warning);
                    }
                }
                None => println!("Nothing scheduled yet. Run 'schedule' first."),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
