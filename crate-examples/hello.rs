// Example of using netrun as a library
//
//   cargo run --example hello -- path/to/config.yaml

use std::sync::Arc;
use netrun::{FnTask, Netrun, Params, ProcessorRef, TaskContext, TaskOutput, TerminalProcessor};

fn main() -> netrun::Result<()> {
    let config_file = std::env::args().nth(1).unwrap_or_else(|| String::from("config.yaml"));

    let nr = Netrun::from_config_file(&config_file)?
        .with_processors(vec![Arc::new(TerminalProcessor::new(1)) as ProcessorRef]);

    let say_hello = FnTask::new("say_hello", |ctx: &mut TaskContext, _params: &Params| {
        let host = ctx.host();
        Ok(TaskOutput::value(format!("Hello, {} - {:?} - {}", host, host.get_group_names(), host.hostname())))
    });

    // everything in the inventory
    nr.run(&say_hello, &Params::new())?;

    // one device, picked by address
    let result = nr.filter_by("hostname", "172.16.10.11").run(&say_hello, &Params::new())?;
    println!("{} host(s) answered", result.len());

    Ok(())
}
