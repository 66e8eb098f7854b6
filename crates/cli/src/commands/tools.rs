//! `finsight tools`: List the registered investment tools.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let assistant = super::bootstrap().await?;

    for def in assistant.tools().definitions() {
        println!("{}", def.name);
        for line in def.description.lines() {
            println!("    {}", line.trim());
        }
        println!();
    }
    Ok(())
}
