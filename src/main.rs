use firestore_db::{
    CollectionLocation, Database, DatabaseSetting, DocumentLocation, Filter, Operator,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Greeting {
    message: String,
    count: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let setting = DatabaseSetting::load()?;
    let database = Database::connect(&setting).await?;

    database
        .write(
            DocumentLocation::new("greetings", "hello"),
            &Greeting {
                message: "hello".to_string(),
                count: 1,
            },
        )
        .wait()
        .await?;

    let ids = vec!["hello", "bye"];
    let reads = ids
        .iter()
        .map(|id| database.read_one::<Greeting>(DocumentLocation::new("greetings", id)));
    for (id, result) in ids.iter().zip(futures::future::join_all(reads).await) {
        println!("{}: {:?}", id, result?);
    }

    let filter = Filter::new().condition("count", Operator::GreaterThan, &0)?;
    let greetings: Vec<Greeting> = database
        .read_many(CollectionLocation::new("greetings"), Some(&filter))
        .await?;
    println!("{:?}", greetings);

    Ok(())
}
