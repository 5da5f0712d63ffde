use logprob_lens::types::validate;
use logprob_lens::{format_columns, render};

fn main() -> logprob_lens::Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: validate_file <response.json>");
        return Ok(());
    };
    let text = std::fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&text)?;
    match validate(&raw) {
        Ok(completion) => {
            let columns = render(&completion)?;
            print!("{}", format_columns(&columns));
        }
        Err(errors) => {
            for violation in &errors {
                eprintln!("{violation}");
            }
            return Err(errors.into());
        }
    }
    Ok(())
}
