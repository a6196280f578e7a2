use access_raptor::utils::CancellationToken;
use access_raptor::{describe, find_routes, rank_routes};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let network = dev_utils::build_example_network();
    let origin = dev_utils::example_origin(&network);
    let destination = dev_utils::example_destination(&network);
    let profile = dev_utils::example_profile();
    let departure = dev_utils::get_example_start_time();

    let cancel = CancellationToken::new();
    let result = find_routes(&network, origin, &[destination], profile, departure, 5, &cancel)?;
    let ranked = rank_routes(&result, 1);

    match ranked.first() {
        Some(route) => println!("{}", describe(route, &network)),
        None => println!("No journey found."),
    }

    Ok(())
}
