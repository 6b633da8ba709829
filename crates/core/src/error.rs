use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArckanaError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Amount does not fit in 256 bits")]
    AmountOutOfRange,

    #[error("Dividend pool does not fit in 256 bits: {0}")]
    PoolOutOfRange(String),

    #[error("Merged balance for {0} does not fit in 256 bits")]
    BalanceOverflow(String),

    #[error("Duplicate holder: {0}")]
    DuplicateHolder(String),

    #[error("No holders to distribute to")]
    NoHolders,
}

pub type Result<T> = std::result::Result<T, ArckanaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_address() {
        let err = ArckanaError::InvalidAddress("0x12".to_string());
        assert_eq!(err.to_string(), "Invalid address: 0x12");
    }

    #[test]
    fn test_error_display_amount_out_of_range() {
        let err = ArckanaError::AmountOutOfRange;
        assert_eq!(err.to_string(), "Amount does not fit in 256 bits");
    }

    #[test]
    fn test_error_display_pool_out_of_range() {
        let err = ArckanaError::PoolOutOfRange("1e99".to_string());
        assert_eq!(err.to_string(), "Dividend pool does not fit in 256 bits: 1e99");
    }

    #[test]
    fn test_error_display_duplicate_holder() {
        let err = ArckanaError::DuplicateHolder("0xabc".to_string());
        assert_eq!(err.to_string(), "Duplicate holder: 0xabc");
    }

    #[test]
    fn test_error_display_no_holders() {
        let err = ArckanaError::NoHolders;
        assert_eq!(err.to_string(), "No holders to distribute to");
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(ArckanaError::NoHolders);
        assert!(result.is_err());
    }
}
