use crate::models::rates::RateSnapshot;
use crate::models::report::{Period, PeriodReport};
use crate::models::transaction::StoredTransaction;

/// A message to send back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Whether `text` uses the chat's Markdown dialect
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }
}

// ── Number formatting ───────────────────────────────────────────────

/// Insert `,` every three digits of an integer string, keeping any sign.
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Local currency amount: rounded to an integer, thousands separated.
///
/// `1234567.6` → `"1,234,568"`
pub fn format_vnd(amount: f64) -> String {
    let rounded = format!("{amount:.0}");
    if rounded == "-0" {
        return "0".to_string();
    }
    group_thousands(&rounded)
}

/// USD amount with two decimals: `2645.5` → `"2,645.50"`
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_thousands(int_part)),
        None => group_thousands(&fixed),
    }
}

/// Asset quantity with at most four decimals and no trailing zeros.
///
/// `100.0` → `"100"`, `0.05` → `"0.05"`
pub fn format_quantity(quantity: f64) -> String {
    let fixed = format!("{quantity:.4}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Upper-case the first letter of every word: `"ăn uống"` → `"Ăn Uống"`.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ── Transaction replies ─────────────────────────────────────────────

/// Usage guide sent when a message yields no transaction.
pub fn help_message() -> Reply {
    Reply::plain(
        "Không hiểu lệnh. Vui lòng nhập đúng cú pháp.\n\
         👋 Chào bạn! Tôi là Bot quản lý tài chính.\n\
         \n\
         📖 *HƯỚNG DẪN SỬ DỤNG:*\n\
         \n\
         1️⃣ *Ghi chép Thu / Chi (VND):*\n\
         _(Bắt buộc phải kèm lý do)_\n\
         - chi 50k ăn trưa\n\
         - thu 10m lương t10\n\
         - -10k trà đá\n\
         - +1,5m tiền lãi bank\n\
         \n\
         2️⃣ *Ghi chép Tiết kiệm / Đầu tư:*\n\
         _(Chỉ nhập số tiền & đơn vị, KHÔNG ghi chú)_\n\
         - tk 2m\n\
         - tiết kiệm 100 usd\n\
         - tk 0.1 btc\n\
         - tk 5 chỉ vàng\n\
         \n\
         3️⃣ *Tiện ích khác:*\n\
         - giá vàng, giá bạc\n\
         - báo cáo",
    )
}

/// Confirmation listing every saved entry, one per line.
pub fn saved_message(saved: &[StoredTransaction]) -> Reply {
    let details: Vec<String> = saved
        .iter()
        .map(|tx| format!("{} {:.2} {}", tx.kind.label(), tx.original_amount, tx.currency))
        .collect();
    Reply::plain(format!(
        "✅ Đã lưu {} giao dịch:\n{}",
        saved.len(),
        details.join("\n")
    ))
}

/// Notice for one entry the store refused.
pub fn save_failed_message() -> Reply {
    Reply::plain("❌ Lỗi hệ thống: Không thể lưu giao dịch.")
}

/// Notice sent when the entries of `period` could not be loaded.
pub fn report_failed_message(period: Period) -> Reply {
    let label = match period {
        Period::Week => "tuần",
        Period::Month => "tháng",
    };
    Reply::plain(format!("❌ Lỗi lấy báo cáo {label}"))
}

// ── Reports ─────────────────────────────────────────────────────────

/// One period block of the report reply.
pub fn report_section(report: &PeriodReport) -> String {
    let title = report.period.title();
    let lower_title = title.to_lowercase();
    let mut text = format!("📅 *{title}:*\n");

    text += &format!("   📈 Thu: {} đ\n", format_vnd(report.total_income));
    text += &format!("   📉 Chi: {} đ\n", format_vnd(report.total_expense));
    text += &format!(
        "   🐷 Đã nạp tiết kiệm: {} đ\n",
        format_vnd(report.total_savings_local)
    );
    text += &format!(
        "   👉 Dư(Thu - Chi tiêu - Tiền đem đi cất): {} đ\n",
        format_vnd(report.balance)
    );

    if !report.expense_by_category.is_empty() {
        text += "   - Chi theo nhóm:\n";
        for (category, amount) in &report.expense_by_category {
            text += &format!("     + {}: {} đ\n", title_case(category), format_vnd(*amount));
        }
    }

    text += &format!("   💰 Tài sản tích lũy theo {lower_title}:\n");
    let mut has_asset = false;
    for (currency, asset) in report.held_assets() {
        has_asset = true;
        text += &format!(
            "     - {} {} (Tỷ giá: {}) = {} đ\n",
            format_quantity(asset.quantity),
            currency,
            format_vnd(asset.rate),
            format_vnd(asset.current_local)
        );
    }
    if !has_asset {
        text += "     (Chưa có tài sản mới)\n";
    }
    text += &format!(
        "   👉 Tổng trị giá tài sản tích lũy theo {lower_title}: {} đ\n",
        format_vnd(report.total_assets_local)
    );

    text
}

/// Week and month reports in one message, separated by a dashed rule.
pub fn report_message(week: &PeriodReport, month: &PeriodReport) -> Reply {
    let mut text = String::from("📊 BÁO CÁO TÀI CHÍNH\n\n");
    text += &report_section(week);
    text += &format!("\n{}\n\n", "-".repeat(20));
    text += &report_section(month);
    Reply::plain(text)
}

// ── Market prices ───────────────────────────────────────────────────

fn usd_header(rates: &RateSnapshot) -> String {
    format!("🔔 TỶ GIÁ: 1 USD = {} VNĐ\n\n", format_vnd(rates.usd_local))
}

fn direction(diff: f64) -> &'static str {
    if diff < 0.0 {
        "VN thấp hơn"
    } else {
        "VN cao hơn"
    }
}

/// World gold vs SJC, per lượng.
pub fn gold_price_message(rates: &RateSnapshot) -> Reply {
    let mut text = usd_header(rates);
    text += "🏆 VÀNG (GOLD)\n";
    text += &format!("• Thế giới: {} USD/oz\n", format_usd(rates.gold_usd));
    text += &format!(
        "• Quy đổi: {} đ/cây\n",
        format_vnd(rates.world_gold_local_per_tael())
    );
    text += &format!(
        "• SJC (Thực tế): {} đ/cây\n",
        format_vnd(rates.gold_local_per_tael())
    );
    text += &format!(
        "⚖️ Chênh lệch: {} {} đ",
        direction(rates.gold_diff),
        format_vnd(rates.gold_diff.abs())
    );
    Reply::plain(text)
}

/// World silver vs the local estimate, per lượng.
pub fn silver_price_message(rates: &RateSnapshot) -> Reply {
    let mut text = usd_header(rates);
    text += "🥈 BẠC (SILVER)\n";
    text += &format!("• Thế giới: {} USD/oz\n", format_usd(rates.silver_usd));
    text += &format!(
        "• Quy đổi: {} đ/cây\n",
        format_vnd(rates.world_silver_local_per_tael())
    );
    text += &format!(
        "• VN (Thực tế): {} đ/cây\n",
        format_vnd(rates.silver_local_est)
    );
    text += &format!(
        "⚖️ Chênh lệch: {} {} đ",
        direction(rates.silver_diff),
        format_vnd(rates.silver_diff.abs())
    );
    Reply::plain(text)
}

/// Scheduled market bulletin.
pub fn bulletin_message(rates: &RateSnapshot, hour: u32) -> Reply {
    Reply::markdown(format!(
        "🔔 *BẢN TIN THỊ TRƯỜNG ({hour}H)* 🔔\n\n\
         🇺🇸 *USD:* {} VNĐ\n\
         🏆 *Vàng (TG):* {} VNĐ/cây\n\
         \u{20}  _(Vàng SJC: {} VNĐ/cây)_\n\
         🥈 *Bạc (TG):* {} VNĐ/cây\n\
         🅱️ *Bitcoin:* {} VNĐ\n",
        format_vnd(rates.usd_local),
        format_vnd(rates.world_gold_local_per_tael()),
        format_vnd(rates.gold_local_per_tael()),
        format_vnd(rates.world_silver_local_per_tael()),
        format_vnd(rates.btc_local),
    ))
}
