mod conv;
mod logger;
mod pool;
mod verify;

use structopt::StructOpt;

#[derive(StructOpt)]
pub enum Options {
    Conv(conv::ConvOptions),
    Pool(pool::PoolOptions),
    Verify(verify::VerifyOptions),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Options::from_args() {
        Options::Conv(options) => options.run(),
        Options::Pool(options) => options.run(),
        Options::Verify(options) => options.run(),
    }
}
