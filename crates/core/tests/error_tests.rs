// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use chat_ledger_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("permission denied".into());
        assert_eq!(err.to_string(), "File I/O error: permission denied");
    }

    #[test]
    fn storage() {
        let err = CoreError::Storage("disk full".into());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn api_error() {
        let err = CoreError::Api {
            provider: "CoinGecko".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (CoinGecko): rate limited");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn timeout() {
        let err = CoreError::Timeout {
            provider: "vang.today".into(),
            millis: 5_000,
        };
        assert_eq!(
            err.to_string(),
            "Rate source vang.today timed out after 5000 ms"
        );
    }

    #[test]
    fn delivery() {
        let err = CoreError::Delivery {
            user_id: "42".into(),
            message: "chat not found".into(),
        };
        assert_eq!(err.to_string(), "Delivery to 42 failed: chat not found");
    }

    #[test]
    fn config() {
        let err = CoreError::Config("bad hour".into());
        assert_eq!(err.to_string(), "Invalid configuration: bad hour");
    }

    #[test]
    fn unknown_period() {
        let err = CoreError::UnknownPeriod("year".into());
        assert_eq!(err.to_string(), "Unknown report period: year");
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("amount must be positive".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: amount must be positive"
        );
    }

    #[test]
    fn unicode_in_message() {
        let err = CoreError::Api {
            provider: "vang.today".into(),
            message: "thiếu giá bán".into(),
        };
        assert_eq!(err.to_string(), "API error (vang.today): thiếu giá bán");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("file not found")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_bincode_error() {
        let bad_data: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<String, _> = bincode::deserialize(bad_data);
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(msg.contains("EOF")),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn from_toml_error() {
        let result: Result<toml::Value, _> = toml::from_str("utc_offset_hours = ");
        let core_err: CoreError = result.unwrap_err().into();
        assert!(matches!(core_err, CoreError::Config(_)));
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn core_error_implements_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::Storage("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn core_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
