use tectonica::config::TectonicaConfig;
use tectonica::{logging, simulation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let path = std::env::args().nth(1);
    let config = TectonicaConfig::resolve(path.as_deref())?;
    let report = simulation::run(&config)?;

    log::info!("plate sizes: {:?}", report.plate_sizes);
    log::info!("segment sizes: {:?}", report.segment_sizes);
    log::info!(
        "stored {} vertices of material in {} bytes",
        report.vertex_count,
        report.store_bytes
    );
    Ok(())
}
