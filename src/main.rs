use dragon_flight::{config::GameConfig, flow, game::GameFlow};

fn main() -> anyhow::Result<()> {
    flow::run(vec![GameFlow::constructor(GameConfig::default())])
}
