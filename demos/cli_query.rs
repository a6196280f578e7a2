use std::io::{stdout, Write};

use access_raptor::utils::CancellationToken;
use access_raptor::{describe, find_routes, rank_routes};

mod common;
use common::parse_profile;

fn prompt(label: &str) -> Result<String, std::io::Error> {
    print!("{label}: ");
    stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let network = dev_utils::build_example_network();
    println!("Loaded example network with {} stations.", network.num_stations());

    loop {
        let origin_code = prompt("Origin station code")?;
        let origin = match network.station_id(&origin_code) {
            Some(id) => id,
            None => {
                println!("Unknown station code. Try again.");
                continue;
            }
        };

        let destination_code = prompt("Destination station code")?;
        let destination = match network.station_id(&destination_code) {
            Some(id) => id,
            None => {
                println!("Unknown station code. Try again.");
                continue;
            }
        };

        let profile = parse_profile(&prompt("Rider profile (PHY/VIS/AUD/ELD)")?);

        let departure = dev_utils::get_example_start_time();
        let cancel = CancellationToken::new();
        let result = find_routes(&network, origin, &[destination], profile, departure, 5, &cancel)?;
        let ranked = rank_routes(&result, 3);

        if ranked.is_empty() {
            println!("No journey found.");
        } else {
            for route in &ranked {
                println!("{}", describe(route, &network));
            }
        }

        break;
    }

    Ok(())
}
