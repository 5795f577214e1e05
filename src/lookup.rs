use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::cli::LookupArgs;
use crate::dispatch::{Dispatcher, LookupOutcome};
use crate::registry::HttpRegistry;

pub async fn run(args: LookupArgs) -> anyhow::Result<()> {
    let registry = HttpRegistry::new(&args.registry.registry_url, &args.registry.api_version)?;
    let dispatcher = Dispatcher::new(Arc::new(registry), args.registry.lookup_config());

    let outcomes = dispatcher
        .lookup(&args.npis)
        .await
        .with_context(|| format!("lookup failed for input {:?}", args.npis))?;

    if args.json {
        let doc = json!({ "results": outcomes });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("Failed encoding results")?
        );
    } else {
        for outcome in &outcomes {
            println!("{}", render_block(outcome));
        }
    }
    Ok(())
}

fn render_block(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found(r) => format!(
            "NPI:           {}\n\
             Name:          {}\n\
             Entity type:   {}\n\
             Sex:           {}\n\
             Specialty:     {}\n\
             License:       {} ({})\n\
             Phone:         {}\n\
             Fax:           {}\n\
             Address:       {}\n\
             Last updated:  {}\n",
            r.npi,
            r.name,
            r.entity_type,
            r.sex,
            r.specialty,
            r.license,
            r.license_state,
            r.phone,
            r.fax,
            r.address,
            r.last_updated,
        ),
        LookupOutcome::Failed(f) => {
            format!("NPI:           {}\nError:         {}\n", f.npi, f.error)
        }
    }
}
