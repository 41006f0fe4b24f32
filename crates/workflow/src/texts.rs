//! User-facing message texts (Uzbek).

use chrono::NaiveDate;
use database::{PaymentSchedule, Receipt, ReceiptStatus, Stage, Student};

/// Format a date the way students expect it: dd.mm.yyyy.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Format a so'm amount with thousands separators: 4 500 000.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    if amount < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

pub const WELCOME: &str = "👋 Assalomu alaykum!\n\n\
    Bu bot orqali to'lov cheklaringizni yuborishingiz va to'lov muddatlari haqida \
    eslatmalar olishingiz mumkin.\n\n\
    📤 Chek yuborish uchun: /submit\n\
    📊 To'lovlar tarixi: /history\n\
    📅 To'lov jadvali: /schedule\n\
    ❓ Yordam: /help";

pub const HELP: &str = "❓ Buyruqlar:\n\n\
    /submit — to'lov chekini yuborish\n\
    /history — to'lovlar tarixi\n\
    /schedule — to'lov jadvali\n\
    /status — joriy to'lov holati\n\
    /cancel — jarayonni bekor qilish\n\n\
    Boshqa savollaringizni shu yerga yozing — buxgalteriya javob beradi.";

pub const PROMPT_STUDENT_ID: &str =
    "📝 Chek yuborish uchun ma'lumotlaringizni kiriting.\n\n🆔 Talaba ID raqamingizni kiriting:";

pub const PROMPT_FIRST_NAME: &str = "✅ Talaba ID qabul qilindi.\n\n📝 Ismingizni kiriting:";

pub const PROMPT_LAST_NAME: &str = "✅ Ism qabul qilindi.\n\n📝 Familiyangizni kiriting:";

pub const PROMPT_PATRONYMIC: &str =
    "✅ Familiya qabul qilindi.\n\n📝 Otangizning ismini kiriting:";

pub const PROMPT_PASSPORT: &str = "✅ Otangizning ismi qabul qilindi.\n\n\
    📄 Pasport seriya va raqamingizni kiriting\nMisol: AA1234567";

pub const PROMPT_NATIONAL_ID: &str =
    "✅ Pasport ma'lumotlari qabul qilindi.\n\n🔢 JSHSHIR raqamingizni kiriting (14 raqam):";

pub const PROMPT_PHONE: &str =
    "✅ JSHSHIR qabul qilindi.\n\n📱 Telefon raqamingizni kiriting\nMisol: +998901234567";

pub const PROMPT_STAGE: &str =
    "✅ Telefon raqam qabul qilindi.\n\n📊 To'lov bosqichini tanlang:";

pub const PROMPT_FILE: &str = "📎 Endi to'lov chekingizni yuboring (rasm yoki PDF fayl)";

pub const ERR_STUDENT_ID: &str =
    "❌ Talaba ID kamida 3 ta belgidan iborat bo'lishi kerak!\n\nQaytadan kiriting:";

pub const ERR_NAME_SHORT: &str =
    "❌ Kamida 2 ta belgidan iborat bo'lishi kerak!\n\nQaytadan kiriting:";

pub const ERR_PASSPORT: &str =
    "❌ Pasport noto'g'ri formatda!\n\nTo'g'ri format: AA1234567\nQaytadan kiriting:";

pub const ERR_NATIONAL_ID: &str = "❌ JSHSHIR noto'g'ri formatda!\n\n\
    JSHSHIR 14 ta raqamdan iborat bo'lishi kerak.\nQaytadan kiriting:";

pub const ERR_PHONE: &str =
    "❌ Telefon raqam noto'g'ri formatda!\n\nTo'g'ri format: +998901234567\nQaytadan kiriting:";

pub const ERR_FILE_TYPE: &str =
    "❌ Faqat rasm (JPG, PNG) yoki PDF fayl yuborishingiz mumkin!\n\nQaytadan yuboring:";

pub const ERR_FILE_SIZE: &str =
    "❌ Fayl hajmi 10 MB dan oshmasligi kerak!\n\nQaytadan yuboring:";

pub const ERR_NO_SCHEDULE: &str = "Bu bosqich uchun to'lov jadvali topilmadi!";

pub const ERR_NOT_IN_FLOW: &str = "Avval /submit buyrug'ini yuboring!";

pub const SUBMITTED: &str = "✅ Chek muvaffaqiyatli yuborildi!\n\n\
    📨 Sizning chekingiz admin va buxgalteriya bo'limiga yuborildi.\n\
    ⏳ Ko'rib chiqilishi kutilmoqda...";

pub const CANCELLED: &str = "❌ Jarayon bekor qilindi.";

pub const ERR_SAVE_FAILED: &str = "❌ Xatolik yuz berdi, ma'lumotlarni saqlab bo'lmadi!\n\n\
    Birozdan keyin qaytadan urinib ko'ring yoki /cancel bilan bekor qiling.";

pub const ANON_RECEIVED: &str = "✅ Savolingiz qabul qilindi.\n\n\
    Buxgalteriya tez orada javob beradi.";

pub const NOT_AUTHORIZED: &str = "❌ Ruxsat yo'q!";

pub const GROUP_NOT_ALLOWED: &str = "❌ Bu botni guruhga faqat admin qo'sha oladi.\n\n\
    Guruhdan chiqib ketyapman.";

/// Summary shown to a returning student before stage selection.
pub fn known_student_summary(student: &Student) -> String {
    format!(
        "📋 Sizning ma'lumotlaringiz:\n\n\
         👤 F.I.O: {}\n\
         🆔 Talaba ID: {}\n\
         📱 Telefon: {}\n\n\
         To'lov bosqichini tanlang:",
        student.full_name(),
        student.student_id,
        student.phone
    )
}

/// Stage chosen, waiting for the file.
pub fn stage_chosen(stage: Stage) -> String {
    format!("✅ To'lov bosqichi: {}\n\n{}", stage.label(), PROMPT_FILE)
}

/// Duplicate receipt for the same stage.
pub fn duplicate_receipt(status: ReceiptStatus) -> String {
    format!(
        "⚠️ Siz bu to'lov bosqichi uchun allaqachon chek yuborgan ekansiz!\n\nStatus: {}",
        status
    )
}

/// Confirmation summary shown before submitting a receipt.
pub fn confirmation_summary(
    student_id: &str,
    last_name: &str,
    first_name: &str,
    patronymic: &str,
    passport: &str,
    national_id: &str,
    phone: &str,
    stage: Stage,
) -> String {
    format!(
        "📋 Ma'lumotlarni tekshiring:\n\n\
         🆔 Talaba ID: {}\n\
         👤 F.I.O: {} {} {}\n\
         📄 Pasport: {}\n\
         🔢 JSHSHIR: {}\n\
         📱 Telefon: {}\n\
         📊 To'lov bosqichi: {}\n\
         ✅ Chek: Yuklandi\n\n\
         Barcha ma'lumotlar to'g'rimi?",
        student_id,
        last_name,
        first_name,
        patronymic,
        passport,
        national_id,
        phone,
        stage.label()
    )
}

/// Caption attached to a receipt forwarded to staff for review.
pub fn staff_receipt_caption(
    student: &Student,
    group_name: Option<&str>,
    schedule: &PaymentSchedule,
    receipt: &Receipt,
) -> String {
    format!(
        "📨 YANGI CHEK KELDI\n\n\
         🆔 Talaba ID: {}\n\
         👤 F.I.O: {}\n\
         📄 Pasport: {}\n\
         🔢 JSHSHIR: {}\n\
         📱 Telefon: {}\n\
         👥 Guruh: {}\n\n\
         📊 To'lov bosqichi: {}\n\
         📅 To'lov muddati: {}\n\
         💰 Summa: {} so'm\n\n\
         ⏰ Yuborilgan vaqt: {}",
        student.student_id,
        student.full_name(),
        student.passport(),
        student.national_id,
        student.phone,
        group_name.unwrap_or("Biriktirilmagan"),
        schedule.stage.label(),
        format_date(schedule.due_date),
        format_amount(schedule.amount),
        receipt.submitted_at
    )
}

/// Student notification after approval.
pub fn receipt_approved(stage: Stage, reviewer: &str) -> String {
    format!(
        "✅ Sizning chekingiz tasdiqlandi!\n\n\
         📊 To'lov: {}\n\
         👤 Tasdiqladi: {}",
        stage.label(),
        reviewer
    )
}

/// Student notification after rejection.
pub fn receipt_rejected(stage: Stage, notes: &str) -> String {
    let mut text = format!(
        "❌ Sizning chekingiz rad etildi!\n\n\
         📊 To'lov: {}\n\
         📝 Iltimos, to'g'ri chek yuboring yoki buxgalteriya bilan bog'laning.",
        stage.label()
    );
    if !notes.is_empty() {
        text.push_str(&format!("\n\n💬 Izoh: {}", notes));
    }
    text
}

/// Default reminder text with an urgency band based on days remaining.
pub fn default_reminder(
    first_name: &str,
    stage: Stage,
    due_date: NaiveDate,
    amount: i64,
    days: i64,
) -> String {
    let (urgency, countdown) = if days == 0 {
        ("🔴 BUGUN!".to_string(), "Bugun to'lov kuni!".to_string())
    } else if days <= 3 {
        ("🟠 SHOSHILING!".to_string(), format!("{} kun qoldi", days))
    } else if days <= 7 {
        ("🟡 DIQQAT!".to_string(), format!("{} kun qoldi", days))
    } else {
        ("🟢 Eslatma".to_string(), format!("{} kun qoldi", days))
    };

    format!(
        "{}\n\n\
         👤 {}, to'lov muddati yaqinlashmoqda!\n\n\
         📊 To'lov bosqichi: {}\n\
         📅 Muddat: {}\n\
         ⏰ {}\n\
         💰 Summa: {} so'm\n\n\
         📤 To'lovdan keyin chekni botga yuborishni unutmang!\n\n\
         ⚠️ Muddatida to'lash majburiy!",
        urgency,
        first_name,
        stage.label(),
        format_date(due_date),
        countdown,
        format_amount(amount)
    )
}

/// Reminder wrapper for group chats, naming the student.
pub fn group_reminder(full_name: &str, body: &str) -> String {
    format!("📢 {}\n\n{}", full_name, body)
}

/// Render a receipt history for a student.
pub fn payment_history(receipts: &[(Receipt, Stage)]) -> String {
    let mut text = String::from("📊 To'lovlar tarixi\n\n");
    if receipts.is_empty() {
        text.push_str("Hozircha hech qanday to'lov cheki yuborilmagan.");
        return text;
    }
    for (receipt, stage) in receipts {
        let emoji = match receipt.status {
            ReceiptStatus::Pending => "⏳",
            ReceiptStatus::Approved => "✅",
            ReceiptStatus::Rejected => "❌",
        };
        text.push_str(&format!(
            "{} {}\n   Sana: {}\n   Status: {}\n",
            emoji,
            stage.label(),
            receipt.submitted_at,
            receipt.status
        ));
        if !receipt.notes.is_empty() {
            text.push_str(&format!("   Izoh: {}\n", receipt.notes));
        }
        text.push('\n');
    }
    text
}

/// Render the active payment schedule list.
pub fn schedule_list(schedules: &[PaymentSchedule]) -> String {
    let mut text = String::from("📅 To'lov jadvali\n\n");
    if schedules.is_empty() {
        text.push_str("To'lov jadvali hali e'lon qilinmagan.");
        return text;
    }
    for schedule in schedules {
        text.push_str(&format!(
            "📌 {}\n   📅 Muddat: {}\n   💰 Summa: {} so'm\n\n",
            schedule.stage.label(),
            format_date(schedule.due_date),
            format_amount(schedule.amount)
        ));
    }
    text
}

/// Notification to staff about a new anonymous question.
pub fn anonymous_question(message_id: i64, text: &str) -> String {
    format!(
        "✉️ YANGI SAVOL\n\n{}\n\nJavob berish uchun: /reply_{}",
        text, message_id
    )
}

/// Reply delivered back to the asking student.
pub fn anonymous_reply(reply: &str) -> String {
    format!("📩 Savolingizga javob keldi:\n\nJavob:\n{}", reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(950), "950");
        assert_eq!(format_amount(4_500_000), "4 500 000");
        assert_eq!(format_amount(-1_000), "-1 000");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
        assert_eq!(format_date(date), "05.09.2025");
    }

    #[test]
    fn test_urgency_bands() {
        let due = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
        let text = |days| default_reminder("Ali", Stage::Quarter1, due, 4_500_000, days);
        assert!(text(0).contains("BUGUN"));
        assert!(text(3).contains("SHOSHILING"));
        assert!(text(7).contains("DIQQAT"));
        assert!(text(30).contains("Eslatma"));
        assert!(text(30).contains("4 500 000 so'm"));
    }
}
