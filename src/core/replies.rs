//! User-facing reply texts

/// Sent instead of a completion when the user is over the limit
pub const RATE_LIMITED: &str = "⚠️ Слишком много запросов. Пожалуйста, подождите минуту.";

/// Transient notice shown while the model is working
pub const PROCESSING: &str = "🔄 Обрабатываю ваш запрос...";

pub const TIMEOUT: &str = "⌛ Время ожидания ответа истекло. Попробуйте позже.";

/// Any completion failure other than a timeout
pub const COMPLETION_FAILED: &str = "⚠️ Произошла ошибка при обработке запроса.\n\
     Попробуйте переформулировать вопрос или повторите позже.";

/// Reply from the outermost failure boundary
pub const UNEXPECTED_ERROR: &str = "⛔ Произошла непредвиденная ошибка.\n\
     Разработчик уже уведомлен. Пожалуйста, попробуйте позже.";

/// Answer to `/start` and `/reset`
pub const WELCOME: &str = "👋 Привет! Я ваш умный помощник.\n\
     📝 История диалога сброшена.\n\
     💡 Как я могу помочь вам сегодня?";

/// Answer to `/help`, HTML formatted
pub fn help(requests_per_minute: usize) -> String {
    format!(
        "ℹ️ <b>Справка по боту</b>\n\n\
         📌 Просто отправьте мне сообщение, и я постараюсь ответить!\n\
         ⏳ Если я не отвечаю, сервер может быть перегружен - попробуйте позже\n\
         🚫 Ограничение: не более {} запросов в минуту\n\n\
         🔄 <code>/reset</code> - сбросить историю диалога\n\
         ❓ <code>/help</code> - показать эту справку",
        requests_per_minute
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_mentions_limit() {
        let text = help(3);
        assert!(text.contains("не более 3 запросов"));
        assert!(text.contains("<code>/help</code>"));
    }

    #[test]
    fn test_failure_texts_are_distinct() {
        assert_ne!(TIMEOUT, COMPLETION_FAILED);
        assert_ne!(COMPLETION_FAILED, UNEXPECTED_ERROR);
    }
}
