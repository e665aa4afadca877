pub fn determine_thread_count(total: Option<usize>) -> anyhow::Result<usize> {
    if let Some(total) = total {
        if total < 1 {
            anyhow::bail!("Cannot set number of threads to zero")
        }
        anyhow::Ok(total)
    } else {
        let total = std::thread::available_parallelism();
        if let Ok(total) = total {
            anyhow::Ok(total.get())
        } else {
            println!("Could not autodetect the number of threads available. Setting to 1, but it is better if you specify");
            anyhow::Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_count_wins() {
        assert_eq!(determine_thread_count(Some(7)).unwrap(), 7);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(determine_thread_count(Some(0)).is_err());
    }

    #[test]
    fn test_autodetect_is_positive() {
        assert!(determine_thread_count(None).unwrap() >= 1);
    }
}
