//! Implementing `Record` by hand instead of deriving it

use flagconf::{setup_into, Field, FlagSet, Record, Tags};

#[derive(Debug, Default)]
struct Config {
    retries: u64,
    endpoint: String,
}

impl Record for Config {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("retries", &mut self.retries).with_tags(Tags::new().with_default("3")),
            Field::new("endpoint", &mut self.endpoint)
                .with_tags(Tags::new().with_help("upstream service URL")),
        ]
    }
}

fn main() -> anyhow::Result<()> {
    let mut config = Config::default();
    let mut flags = FlagSet::new("manual");
    setup_into(&mut config, "manual", &mut flags)?;

    println!("{}", flags.render_help());

    flags.parse(["--endpoint", "https://example.com"])?;
    drop(flags);

    println!("{config:?}");

    Ok(())
}
