use cucumber::{World, WriterExt};
use streamy_live_tests::LiveWorld;

mod steps;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    LiveWorld::cucumber()
        .max_concurrent_scenarios(1)
        .with_writer(
            cucumber::writer::Basic::raw(std::io::stdout(), cucumber::writer::Coloring::Auto, 0)
                .summarized()
                .assert_normalized(),
        )
        .run_and_exit("tests/features")
        .await;
}
