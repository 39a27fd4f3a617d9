use crate::output::{print_json, print_table};
use anyhow::Result;
use wakey_server::radio::STATIONS;

pub fn run(json: bool) -> Result<()> {
    if json {
        return print_json(&STATIONS);
    }
    let rows = STATIONS
        .iter()
        .map(|s| vec![s.id.to_string(), s.name.to_string(), s.url.to_string()])
        .collect();
    print_table(&["ID", "NAME", "URL"], rows);
    Ok(())
}
