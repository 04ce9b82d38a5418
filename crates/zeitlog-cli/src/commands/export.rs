use chrono::NaiveDate;
use zeitlog_core::export;

/// Print completed entries as CSV lines, most recent start first.
///
/// Core hands over pre-formatted rows; this module owns the text encoding.
pub fn run(from: Option<String>, to: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::context()?;

    let from = from
        .map(|s| parse_date(&s))
        .transpose()?
        .map(export::start_of_day);
    let to = to
        .map(|s| parse_date(&s))
        .transpose()?
        .map(export::end_of_day);

    let entries = {
        let db = ctx.db.lock().unwrap_or_else(|p| p.into_inner());
        db.export_entries(from, to)?
    };
    let rows = export::rows(&entries);

    println!("project,description,start,end,duration_minutes,date");
    for row in rows {
        println!(
            "{},{},{},{},{},{}",
            quote(&row.project),
            quote(&row.description),
            row.start_clock,
            row.end_clock,
            row.duration_minutes,
            row.date
        );
    }
    Ok(())
}

fn parse_date(text: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| format!("bad date '{text}', expected YYYY-MM-DD"))?)
}

/// Minimal CSV quoting: wrap when the field contains a delimiter or quote.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_unquoted() {
        assert_eq!(quote("Alpha"), "Alpha");
    }

    #[test]
    fn delimiters_and_quotes_trigger_quoting() {
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
