use corkboard::client::Client;
use corkboard::config::Config;
use corkboard::traits::TaskBackend;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().unwrap();
    let client = Client::new(config).unwrap();

    let tasks = client.list_tasks().await.unwrap();
    for task in &tasks {
        let deadline = task
            .deadline()
            .map(|deadline| deadline.to_string())
            .unwrap_or_else(|| String::from("no deadline"));
        println!(
            "[{}] {}: {}\t({}, {})",
            task.status(),
            task.class_name(),
            task.assignment(),
            task.priority(),
            deadline
        );
    }
}
